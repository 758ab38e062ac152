//! Expense share rows.
//!
//! A `Share` links one user to one expense with the amount that user owes.
//! Shares are owned by their expense (cascade-deleted with it) and are never
//! mutated independently.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// The amount a single user owes for a single expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub user_id: Uuid,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub expense_id: String,
    pub user_id: String,
    pub amount_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Share {
    pub(crate) fn active_model(&self, expense_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            expense_id: ActiveValue::Set(expense_id.to_string()),
            user_id: ActiveValue::Set(self.user_id.to_string()),
            amount_cents: ActiveValue::Set(self.amount.cents()),
        }
    }
}

impl TryFrom<Model> for Share {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::NotFound("user not exists".to_string()))?,
            amount: Money::new(model.amount_cents),
        })
    }
}
