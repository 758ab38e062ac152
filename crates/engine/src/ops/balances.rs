use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, SplitMethod, expenses, shares};

use super::Engine;

/// One line of a user's balance sheet: an expense they participate in and the
/// amount they owe for it (not the expense total).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceRow {
    pub expense_id: Uuid,
    pub description: String,
    pub total: Money,
    pub method: SplitMethod,
    pub amount_owed: Money,
}

impl Engine {
    /// The user's owed amount for every expense they hold a share in.
    ///
    /// Rows are ordered by expense creation time ascending (id as
    /// tie-breaker), so repeated calls without intervening writes return
    /// identical results. Read-only.
    pub async fn balance_sheet(&self, user_id: Uuid) -> ResultEngine<Vec<BalanceRow>> {
        self.require_user(&self.database, user_id).await?;

        let rows: Vec<(shares::Model, Option<expenses::Model>)> = shares::Entity::find()
            .filter(shares::Column::UserId.eq(user_id.to_string()))
            .find_also_related(expenses::Entity)
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;

        rows.into_iter()
            .map(|(share, expense)| {
                let expense = expense
                    .ok_or_else(|| EngineError::NotFound("expense not exists".to_string()))?;
                Ok(BalanceRow {
                    expense_id: Uuid::parse_str(&expense.id)
                        .map_err(|_| EngineError::NotFound("expense not exists".to_string()))?,
                    description: expense.description,
                    total: Money::new(expense.total_cents),
                    method: SplitMethod::try_from(expense.split_method.as_str())?,
                    amount_owed: Money::new(share.amount_cents),
                })
            })
            .collect()
    }
}
