//! Defines the endpoint for listing expenses.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{
    Error,
    expense::{
        ExpenseState,
        core::Expense,
        filter::{ExpenseFilter, ExpenseQuery, get_expenses},
    },
    timezone::get_local_date,
};

/// A route handler for listing the expenses that match the query filters, newest first.
///
/// Date range presets are resolved against today's date in the server's
/// local timezone.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, Error> {
    let Query(query) = query?;
    let filter = ExpenseFilter::from(&query);
    let today = get_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_expenses(&filter, today, &connection)
        .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?;

    Ok(Json(expenses))
}
