//! Expense Manager is a small web service for tracking personal expenses.
//!
//! This library provides a JSON REST API for recording expenses, listing them
//! with category, payment mode and date range filters, and summarising them
//! as monthly per-category totals.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod analytics;
mod app_state;
mod db;
mod endpoints;
mod error;
mod expense;
mod logging;
mod not_found;
mod routing;
mod timezone;

pub use analytics::{
    AnalyticsState, CategoryTotal, MonthlyRollup, get_analytics_endpoint,
    get_monthly_category_totals, get_monthly_rollup, rollup_by_month,
};
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorMessage};
pub use expense::{
    AmountInput, Category, DateRangePreset, Expense, ExpenseFilter, ExpenseForm, ExpenseId,
    ExpenseQuery, ExpenseState, MISSING_FIELDS_MESSAGE, NewExpense, PaymentMode, count_expenses,
    create_expense, create_expense_endpoint, create_expense_table, get_expense, get_expenses,
    list_expenses_endpoint, map_expense_row,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::{build_router, cors_layer};
pub use timezone::{get_local_date, get_local_offset};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
