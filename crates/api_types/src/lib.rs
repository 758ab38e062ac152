//! Request/response types shared by the server and its clients.
//!
//! Monetary amounts cross the wire as decimal strings with at most two
//! fractional digits ("100.00"), percentages likewise ("33.33"). The server
//! parses them into engine types at the boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Strategy for dividing a total expense amount among participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    Equal,
    Exact,
    Percentage,
}

pub mod user {
    use super::*;

    /// Registration request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub name: String,
        pub password: String,
    }

    /// A user, without credential material.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserListResponse {
        pub users: Vec<UserView>,
    }
}

pub mod expense {
    use super::*;

    /// Split inputs, tagged by method.
    ///
    /// The tag decides which participant shape is accepted, so a payload that
    /// omits an amount on an exact split (or carries one on an equal split)
    /// is rejected during deserialization, before it reaches the engine.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "split_method", rename_all = "snake_case")]
    pub enum SplitSpec {
        Equal { participants: Vec<Uuid> },
        Exact { participants: Vec<ExactShare> },
        Percentage { participants: Vec<PercentShare> },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExactShare {
        pub user_id: Uuid,
        /// Decimal string, e.g. "75.50".
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PercentShare {
        pub user_id: Uuid,
        /// Decimal string, e.g. "33.33".
        pub percentage: String,
    }

    /// Expense creation request. The creator is the authenticated user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        /// Decimal string, e.g. "100.00".
        pub total_amount: String,
        #[serde(flatten)]
        pub split: SplitSpec,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub user_id: Uuid,
        /// Decimal string, e.g. "25.00".
        pub amount_owed: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub total_amount: String,
        pub split_method: SplitMethod,
        pub created_by: Uuid,
        pub participants: Vec<ShareView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    /// One balance-sheet line: the user's own owed amount for one expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceRowView {
        pub expense_id: Uuid,
        pub description: String,
        pub total_amount: String,
        pub split_method: SplitMethod,
        pub amount_owed: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceSheetResponse {
        pub rows: Vec<BalanceRowView>,
    }
}
