//! Expense API endpoints

use api_types::expense::{ExpenseListResponse, ExpenseNew, ExpenseView, ShareView, SplitSpec};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_method(method: engine::SplitMethod) -> api_types::SplitMethod {
    match method {
        engine::SplitMethod::Equal => api_types::SplitMethod::Equal,
        engine::SplitMethod::Exact => api_types::SplitMethod::Exact,
        engine::SplitMethod::Percentage => api_types::SplitMethod::Percentage,
    }
}

/// Parses the wire split payload into the engine's typed split.
///
/// Amount/percentage strings that fail to parse surface as 422 through
/// `EngineError::Validation`.
fn parse_split(spec: SplitSpec) -> Result<engine::Split, ServerError> {
    let split = match spec {
        SplitSpec::Equal { participants } => engine::Split::Equal { participants },
        SplitSpec::Exact { participants } => engine::Split::Exact {
            participants: participants
                .into_iter()
                .map(|share| Ok((share.user_id, share.amount.parse::<engine::Money>()?)))
                .collect::<Result<_, engine::EngineError>>()?,
        },
        SplitSpec::Percentage { participants } => engine::Split::Percentage {
            participants: participants
                .into_iter()
                .map(|share| Ok((share.user_id, share.percentage.parse::<engine::Percent>()?)))
                .collect::<Result<_, engine::EngineError>>()?,
        },
    };
    Ok(split)
}

fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        description: expense.description,
        total_amount: expense.total.to_string(),
        split_method: map_method(expense.method),
        created_by: expense.created_by,
        participants: expense
            .shares
            .into_iter()
            .map(|share| ShareView {
                user_id: share.user_id,
                amount_owed: share.amount.to_string(),
            })
            .collect(),
    }
}

/// Creates an expense with its shares. The creator is the authenticated user.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let total = payload
        .total_amount
        .parse::<engine::Money>()
        .map_err(ServerError::Engine)?;
    let split = parse_split(payload.split)?;

    let expense = state
        .engine
        .create_expense(engine::CreateExpenseCmd {
            description: payload.description,
            total,
            split,
            created_by: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(expense))))
}

/// Every expense, with nested shares.
pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state.engine.list_expenses().await?;

    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(view).collect(),
    }))
}

/// Expenses the given user participates in.
pub async fn for_user(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state.engine.expenses_for_user(id).await?;

    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(view).collect(),
    }))
}
