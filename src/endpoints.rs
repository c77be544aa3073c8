//! The paths of the REST API.
//!
//! Route handlers and tests should use these constants instead of string literals.

/// The route for creating (POST) and listing (GET) expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for the monthly per-category expense totals.
pub const EXPENSE_ANALYTICS: &str = "/api/expenses/analytics";
