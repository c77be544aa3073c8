//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model with its closed `Category` and `PaymentMode` enumerations
//! - Database functions for storing and querying expenses
//! - The filter engine behind the expense list
//! - Route handlers for creating and listing expenses

mod core;
mod create_endpoint;
mod filter;
mod list_endpoint;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use self::core::{
    Category, Expense, ExpenseId, NewExpense, PaymentMode, count_expenses, create_expense,
    create_expense_table, get_expense, map_expense_row,
};
pub use create_endpoint::{
    AmountInput, ExpenseForm, MISSING_FIELDS_MESSAGE, create_expense_endpoint,
};
pub use filter::{DateRangePreset, ExpenseFilter, ExpenseQuery, get_expenses};
pub use list_endpoint::list_expenses_endpoint;

/// The state needed to create or list expenses.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
