//! Balance sheet endpoints: JSON rows and CSV download.

use api_types::balance::{BalanceRowView, BalanceSheetResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use csv::Writer;
use uuid::Uuid;

use crate::{ServerError, expense::map_method, server::ServerState};

fn view(row: engine::BalanceRow) -> BalanceRowView {
    BalanceRowView {
        expense_id: row.expense_id,
        description: row.description,
        total_amount: row.total.to_string(),
        split_method: map_method(row.method),
        amount_owed: row.amount_owed.to_string(),
    }
}

/// The user's balance sheet as JSON.
pub async fn sheet(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceSheetResponse>, ServerError> {
    let rows = state.engine.balance_sheet(id).await?;

    Ok(Json(BalanceSheetResponse {
        rows: rows.into_iter().map(view).collect(),
    }))
}

/// The user's balance sheet as a CSV attachment.
///
/// Header is fixed: `Expense ID,Description,Total Amount,Split Method,Amount
/// Owed`. Amounts are two-decimal strings, the split method is lowercase.
pub async fn download(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServerError> {
    let rows = state.engine.balance_sheet(id).await?;

    let mut writer = Writer::from_writer(vec![]);
    writer
        .write_record([
            "Expense ID",
            "Description",
            "Total Amount",
            "Split Method",
            "Amount Owed",
        ])
        .map_err(|err| ServerError::Generic(err.to_string()))?;
    for row in rows {
        writer
            .write_record([
                row.expense_id.to_string(),
                row.description,
                row.total.to_string(),
                row.method.as_str().to_string(),
                row.amount_owed.to_string(),
            ])
            .map_err(|err| ServerError::Generic(err.to_string()))?;
    }

    let data = writer
        .into_inner()
        .map_err(|err| ServerError::Generic(err.to_string()))?;
    let body = String::from_utf8(data).map_err(|err| ServerError::Generic(err.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"balance_sheet_user_{id}.csv\""),
        ),
    ];

    Ok((headers, body).into_response())
}
