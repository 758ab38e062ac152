//! Core engine for the expense-splitting service.
//!
//! The [`Engine`] owns the database connection and exposes every operation the
//! outer layers need: user registration, expense creation with split
//! computation, expense listing, and per-user balance sheets. All writes that
//! touch more than one row run inside a single database transaction.

pub use error::EngineError;
pub use expenses::{Expense, SplitMethod};
pub use money::{Money, Percent};
pub use ops::{BalanceRow, CreateExpenseCmd, Engine, EngineBuilder, RegisterUserCmd};
pub use shares::Share;
pub use split::{Split, compute_shares};
pub use users::User;

mod error;
pub mod expenses;
mod money;
mod ops;
pub mod shares;
mod split;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
