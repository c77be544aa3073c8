//! Defines the endpoint for the monthly expense rollup.

use axum::{Json, extract::State};

use crate::{
    Error,
    analytics::{
        AnalyticsState,
        aggregation::{MonthlyRollup, get_monthly_rollup},
    },
};

/// A route handler for the monthly per-category totals of all expenses.
///
/// The expense list filters do not apply here.
pub async fn get_analytics_endpoint(
    State(state): State<AnalyticsState>,
) -> Result<Json<Vec<MonthlyRollup>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rollup = get_monthly_rollup(&connection)
        .inspect_err(|error| tracing::error!("could not get monthly rollup: {error}"))?;

    Ok(Json(rollup))
}
