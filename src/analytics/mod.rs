//! Expense analytics.
//!
//! Provides the monthly rollup of expense totals per category, computed over
//! every stored expense.

mod aggregation;
mod endpoint;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use aggregation::{
    CategoryTotal, MonthlyRollup, get_monthly_category_totals, get_monthly_rollup,
    rollup_by_month,
};
pub use endpoint::get_analytics_endpoint;

/// The state needed to compute analytics.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
