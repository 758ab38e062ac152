use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, Select, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, Money, ResultEngine, Share, Split, expenses, shares, split,
};

use super::{Engine, normalize_required_text, with_tx};

/// Inputs for [`Engine::create_expense`].
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub description: String,
    pub total: Money,
    pub split: Split,
    pub created_by: Uuid,
}

impl Engine {
    /// Creates an expense together with one share row per participant.
    ///
    /// Everything runs in a single database transaction: when the creator or
    /// any participant is unknown, or the split inputs are invalid, nothing is
    /// persisted.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<Expense> {
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let result: ResultEngine<Expense> = async {
                self.require_user(&db_tx, cmd.created_by).await?;
                for user_id in cmd.split.participant_ids() {
                    self.require_user(&db_tx, user_id).await?;
                }

                let computed = split::compute_shares(cmd.total, &cmd.split)?;

                let mut expense = Expense::new(
                    description,
                    cmd.total,
                    cmd.split.method(),
                    cmd.created_by,
                    Utc::now(),
                );
                expense.shares = computed
                    .into_iter()
                    .map(|(user_id, amount)| Share { user_id, amount })
                    .collect();

                expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
                for share in &expense.shares {
                    share.active_model(expense.id).insert(&db_tx).await?;
                }

                Ok(expense)
            }
            .await;

            match &result {
                Ok(expense) => tracing::info!(
                    expense_id = %expense.id,
                    method = expense.method.as_str(),
                    participants = expense.shares.len(),
                    "created expense"
                ),
                Err(err) => tracing::debug!("expense creation rejected: {err}"),
            }
            result
        })
    }

    /// Every expense with its nested shares, oldest first.
    pub async fn list_expenses(&self) -> ResultEngine<Vec<Expense>> {
        let models = ordered_expenses().all(&self.database).await?;
        self.with_shares(&self.database, models).await
    }

    /// Expenses in which the user holds a share, with nested shares, oldest
    /// first.
    pub async fn expenses_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        self.require_user(&self.database, user_id).await?;

        let share_models = shares::Entity::find()
            .filter(shares::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?;
        let expense_ids: Vec<String> = share_models
            .into_iter()
            .map(|share| share.expense_id)
            .collect();

        let models = ordered_expenses()
            .filter(expenses::Column::Id.is_in(expense_ids))
            .all(&self.database)
            .await?;
        self.with_shares(&self.database, models).await
    }

    /// Attaches share rows to expense models, preserving insertion order
    /// within each expense.
    async fn with_shares<C: ConnectionTrait>(
        &self,
        db: &C,
        models: Vec<expenses::Model>,
    ) -> ResultEngine<Vec<Expense>> {
        let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
        let share_models = shares::Entity::find()
            .filter(shares::Column::ExpenseId.is_in(ids))
            .order_by_asc(shares::Column::Id)
            .all(db)
            .await?;

        let mut by_expense: HashMap<String, Vec<Share>> = HashMap::new();
        for model in share_models {
            let expense_id = model.expense_id.clone();
            by_expense
                .entry(expense_id)
                .or_default()
                .push(Share::try_from(model)?);
        }

        models
            .into_iter()
            .map(|model| {
                let key = model.id.clone();
                let mut expense = Expense::try_from(model)?;
                expense.shares = by_expense.remove(&key).unwrap_or_default();
                Ok(expense)
            })
            .collect()
    }
}

/// Stable listing order: creation time ascending, id as tie-breaker.
fn ordered_expenses() -> Select<expenses::Entity> {
    expenses::Entity::find()
        .order_by_asc(expenses::Column::CreatedAt)
        .order_by_asc(expenses::Column::Id)
}
