//! Filtering for the expense list.
//!
//! Translates the optional `category`, `payment_mode` and `dateRange` query
//! parameters into a SQL `WHERE` clause and runs the resulting query.

use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::Error;

use super::core::{Category, Expense, PaymentMode, map_expense_row};

/// The raw query parameters accepted by the expense list endpoint.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ExpenseQuery {
    /// Comma separated category names.
    pub category: Option<String>,
    /// Comma separated payment mode names.
    pub payment_mode: Option<String>,
    /// One of `thisMonth`, `last30Days` or `last90Days`.
    #[serde(rename = "dateRange")]
    pub date_range: Option<String>,
}

/// A preset lower bound on expense dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    /// From the first day of the current month.
    ThisMonth,
    /// From 30 days before today.
    Last30Days,
    /// From 90 days before today.
    Last90Days,
}

impl DateRangePreset {
    /// Parse the `dateRange` query value. Unknown values give `None`.
    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "thisMonth" => Some(Self::ThisMonth),
            "last30Days" => Some(Self::Last30Days),
            "last90Days" => Some(Self::Last90Days),
            _ => None,
        }
    }

    /// The earliest date, inclusive, that falls inside the preset when the
    /// current date is `today`.
    pub fn start_date(self, today: Date) -> Date {
        match self {
            Self::ThisMonth => today - Duration::days(i64::from(today.day()) - 1),
            Self::Last30Days => today - Duration::days(30),
            Self::Last90Days => today - Duration::days(90),
        }
    }
}

/// The filters applied to the expense list. Every filter that is set must
/// match for an expense to be listed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpenseFilter {
    /// Only list expenses in one of these categories.
    ///
    /// `Some` with an empty list matches nothing, which happens when none of
    /// the requested names is a real category.
    pub categories: Option<Vec<Category>>,
    /// Only list expenses paid with one of these payment modes.
    ///
    /// Same semantics as `categories`.
    pub payment_modes: Option<Vec<PaymentMode>>,
    /// Only list expenses dated on or after the start of this range.
    pub date_range: Option<DateRangePreset>,
}

impl From<&ExpenseQuery> for ExpenseFilter {
    fn from(query: &ExpenseQuery) -> Self {
        Self {
            categories: parse_name_list(query.category.as_deref(), Category::from_name),
            payment_modes: parse_name_list(query.payment_mode.as_deref(), PaymentMode::from_name),
            date_range: query
                .date_range
                .as_deref()
                .and_then(DateRangePreset::from_query_value),
        }
    }
}

/// Split a comma separated list of names, dropping names that `parse` does not know.
///
/// An absent or empty list gives `None`, i.e. no restriction.
fn parse_name_list<T>(names: Option<&str>, parse: fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let names = names.filter(|names| !names.is_empty())?;

    Some(names.split(',').filter_map(parse).collect())
}

impl ExpenseFilter {
    /// Build the `WHERE` clause for this filter along with its positional parameters.
    ///
    /// Returns an empty clause when no filter is set. `today` is used to
    /// resolve the date range preset.
    pub fn where_clause(&self, today: Date) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(categories) = &self.categories {
            conditions.push(in_condition("category", categories.len()));
            params.extend(categories.iter().map(|category| category.to_string()));
        }

        if let Some(payment_modes) = &self.payment_modes {
            conditions.push(in_condition("payment_mode", payment_modes.len()));
            params.extend(payment_modes.iter().map(|mode| mode.to_string()));
        }

        if let Some(date_range) = self.date_range {
            conditions.push("date >= ?".to_owned());
            params.push(date_range.start_date(today).to_string());
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

fn in_condition(column: &str, count: usize) -> String {
    if count == 0 {
        // None of the requested names exist, so nothing can match.
        return "0".to_owned();
    }

    let placeholders = vec!["?"; count].join(",");
    format!("{column} IN ({placeholders})")
}

/// Get the expenses matching `filter`, newest first.
///
/// Expenses on the same date are ordered by ID so that repeated queries return
/// the same order.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped to an [Expense].
pub fn get_expenses(
    filter: &ExpenseFilter,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let (where_clause, params) = filter.where_clause(today);

    let query = format!(
        "SELECT id, amount, category, notes, date, payment_mode, created_at FROM expense \
        {where_clause} \
        ORDER BY date DESC, id ASC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_expense_row)?
        .collect::<Result<Vec<Expense>, rusqlite::Error>>()
        .map_err(|error| error.into())
}
