//! Monthly per-category expense totals.
//!
//! The grouping and summing is done by SQLite in [get_monthly_category_totals],
//! and [rollup_by_month] reshapes the groups into one row per month for charting.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, expense::Category};

/// The summed amount of one category in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The calendar year.
    pub year: i32,
    /// The calendar month, 1 to 12.
    pub month: u8,
    /// The category the amounts belong to.
    pub category: Category,
    /// The sum of the amounts.
    pub total: f64,
}

/// One month of the rollup.
///
/// Serializes as a flat object, e.g. `{"month": "2024-01", "Rental": 100.0}`.
/// Categories with no expenses in the month are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    /// The month as `YYYY-MM`.
    pub month: String,
    /// The total spent in each category that month.
    #[serde(flatten)]
    pub totals: BTreeMap<Category, f64>,
}

/// Sum the amounts of all expenses per calendar month and category.
///
/// The results are sorted by year and then month.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn get_monthly_category_totals(connection: &Connection) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT
                CAST(strftime('%Y', date) AS INTEGER) AS year,
                CAST(strftime('%m', date) AS INTEGER) AS month,
                category,
                SUM(amount) AS total
            FROM expense
            GROUP BY year, month, category
            ORDER BY year ASC, month ASC",
        )?
        .query_map([], |row| {
            Ok(CategoryTotal {
                year: row.get(0)?,
                month: row.get(1)?,
                category: row.get(2)?,
                total: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<CategoryTotal>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Reshape per-category totals into one row per month, oldest month first.
///
/// Totals for the same month and category are added together, so the input
/// does not need to be sorted or unique.
pub fn rollup_by_month(totals: &[CategoryTotal]) -> Vec<MonthlyRollup> {
    let mut months: BTreeMap<(i32, u8), BTreeMap<Category, f64>> = BTreeMap::new();

    for total in totals {
        *months
            .entry((total.year, total.month))
            .or_default()
            .entry(total.category)
            .or_insert(0.0) += total.total;
    }

    months
        .into_iter()
        .map(|((year, month), totals)| MonthlyRollup {
            month: format!("{year:04}-{month:02}"),
            totals,
        })
        .collect()
}

/// Get the monthly rollup of every expense in the database.
///
/// # Errors
/// Returns [Error::SqlError] if the totals cannot be queried.
pub fn get_monthly_rollup(connection: &Connection) -> Result<Vec<MonthlyRollup>, Error> {
    let totals = get_monthly_category_totals(connection)?;

    Ok(rollup_by_month(&totals))
}
