//! Expense primitives.
//!
//! An `Expense` is an immutable record of a shared cost: a total amount, the
//! method used to split it, and one [`Share`] per participant. The share rows
//! are created in the same database transaction as the expense and the sum of
//! their amounts always equals the expense total.
//!
//! [`Share`]: super::shares::Share

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, shares};

/// Strategy for dividing a total expense amount among participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    Equal,
    Exact,
    Percentage,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Exact => "exact",
            Self::Percentage => "percentage",
        }
    }
}

impl TryFrom<&str> for SplitMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "exact" => Ok(Self::Exact),
            "percentage" => Ok(Self::Percentage),
            other => Err(EngineError::Validation(format!(
                "invalid split method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub total: Money,
    pub method: SplitMethod,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub shares: Vec<shares::Share>,
}

impl Expense {
    pub fn new(
        description: String,
        total: Money,
        method: SplitMethod,
        created_by: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            total,
            method,
            created_by,
            created_at,
            shares: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub total_cents: i64,
    pub split_method: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            total_cents: ActiveValue::Set(expense.total.cents()),
            split_method: ActiveValue::Set(expense.method.as_str().to_string()),
            created_by: ActiveValue::Set(expense.created_by.to_string()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("expense not exists".to_string()))?,
            description: model.description,
            total: Money::new(model.total_cents),
            method: SplitMethod::try_from(model.split_method.as_str())?,
            created_by: Uuid::parse_str(&model.created_by)
                .map_err(|_| EngineError::NotFound("user not exists".to_string()))?,
            created_at: model.created_at,
            shares: Vec::new(),
        })
    }
}
