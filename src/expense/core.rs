//! Defines the core data models and database queries for expenses.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for expense IDs.
pub type ExpenseId = i64;

/// What an expense was spent on.
///
/// The variants are declared in the order they are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Rent and other housing costs.
    Rental,
    /// Food and household supplies.
    Groceries,
    /// Movies, concerts, subscriptions and the like.
    Entertainment,
    /// Transport and trips.
    Travel,
    /// Anything that does not fit the other categories.
    Others,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Rental,
        Category::Groceries,
        Category::Entertainment,
        Category::Travel,
        Category::Others,
    ];

    /// The name of the category as it appears in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Rental => "Rental",
            Category::Groceries => "Groceries",
            Category::Entertainment => "Entertainment",
            Category::Travel => "Travel",
            Category::Others => "Others",
        }
    }

    /// Find the category with the exact name `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == name)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;

        Category::from_name(name)
            .ok_or_else(|| FromSqlError::Other(format!("unknown category \"{name}\"").into()))
    }
}

/// How an expense was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Unified Payments Interface.
    #[serde(rename = "UPI")]
    Upi,
    /// Credit card.
    #[serde(rename = "Credit Card")]
    CreditCard,
    /// Bank transfer.
    #[serde(rename = "Net Banking")]
    NetBanking,
    /// Cash.
    Cash,
}

impl PaymentMode {
    /// Every payment mode, in display order.
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Upi,
        PaymentMode::CreditCard,
        PaymentMode::NetBanking,
        PaymentMode::Cash,
    ];

    /// The name of the payment mode as it appears in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Upi => "UPI",
            PaymentMode::CreditCard => "Credit Card",
            PaymentMode::NetBanking => "Net Banking",
            PaymentMode::Cash => "Cash",
        }
    }

    /// Find the payment mode with the exact name `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|payment_mode| payment_mode.as_str() == name)
    }
}

impl Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for PaymentMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaymentMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;

        PaymentMode::from_name(name)
            .ok_or_else(|| FromSqlError::Other(format!("unknown payment mode \"{name}\"").into()))
    }
}

/// A record of money that was spent.
///
/// Expenses are never modified after they are created. To create a new
/// `Expense`, use [Expense::build] and [create_expense].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount of money spent.
    pub amount: f64,
    /// What the money was spent on.
    pub category: Category,
    /// Free text about the expense, may be empty.
    pub notes: String,
    /// When the money was spent.
    pub date: Date,
    /// How the expense was paid for.
    pub payment_mode: PaymentMode,
    /// When the expense was recorded, set by the server.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [NewExpense] for discoverability.
    pub fn build(
        amount: f64,
        category: Category,
        date: Date,
        payment_mode: PaymentMode,
    ) -> NewExpense {
        NewExpense {
            amount,
            category,
            notes: String::new(),
            date,
            payment_mode,
        }
    }
}

/// A validated expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The amount of money spent.
    ///
    /// Only zero is rejected when parsing client input. Negative amounts are
    /// stored as given.
    pub amount: f64,
    /// What the money was spent on.
    pub category: Category,
    /// Free text about the expense. Defaults to an empty string.
    pub notes: String,
    /// When the money was spent.
    pub date: Date,
    /// How the expense was paid for.
    pub payment_mode: PaymentMode,
}

impl NewExpense {
    /// Set the notes for the expense.
    pub fn notes(mut self, notes: &str) -> Self {
        notes.clone_into(&mut self.notes);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Save a new expense to the database.
///
/// The creation timestamp is taken from the server clock, in UTC.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let created_at = OffsetDateTime::now_utc();

    let expense = connection
        .prepare(
            "INSERT INTO expense (amount, category, notes, date, payment_mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, amount, category, notes, date, payment_mode, created_at",
        )?
        .query_row(
            (
                new_expense.amount,
                new_expense.category,
                new_expense.notes,
                new_expense.date,
                new_expense.payment_mode,
                created_at,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, amount, category, notes, date, payment_mode, created_at
             FROM expense WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Get the total number of expenses in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM expense", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                category TEXT NOT NULL
                    CHECK (category IN ('Rental', 'Groceries', 'Entertainment', 'Travel', 'Others')),
                notes TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                payment_mode TEXT NOT NULL
                    CHECK (payment_mode IN ('UPI', 'Credit Card', 'Net Banking', 'Cash')),
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Used by the date range filter and the ordering of the expense list.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
        (),
    )?;

    // Used by the monthly rollup.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date_category ON expense(date, category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an Expense.
///
/// Expects the columns `id, amount, category, notes, date, payment_mode, created_at`
/// in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        notes: row.get(3)?,
        date: row.get(4)?,
        payment_mode: row.get(5)?,
        created_at: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use serde_json::json;
    use time::macros::{date, datetime};

    use super::{Category, Expense, PaymentMode};

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.as_str()), Some(category));
        }
    }

    #[test]
    fn category_names_are_case_sensitive() {
        assert_eq!(Category::from_name("rental"), None);
        assert_eq!(Category::from_name(" Rental"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn payment_mode_names_keep_spaces() {
        assert_eq!(
            PaymentMode::from_name("Credit Card"),
            Some(PaymentMode::CreditCard)
        );
        assert_eq!(
            PaymentMode::from_name("Net Banking"),
            Some(PaymentMode::NetBanking)
        );
        assert_eq!(PaymentMode::from_name("UPI"), Some(PaymentMode::Upi));
        assert_eq!(PaymentMode::from_name("CreditCard"), None);
    }

    #[test]
    fn serde_names_match_database_names() {
        for payment_mode in PaymentMode::ALL {
            assert_eq!(
                serde_json::to_value(payment_mode).unwrap(),
                json!(payment_mode.as_str())
            );
        }

        for category in Category::ALL {
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                json!(category.as_str())
            );
        }
    }

    #[test]
    fn deserializing_unknown_category_fails() {
        let result = serde_json::from_value::<Category>(json!("Utilities"));

        assert!(result.is_err());
    }

    #[test]
    fn expense_serializes_dates_as_strings() {
        let expense = Expense {
            id: 1,
            amount: 12.5,
            category: Category::Groceries,
            notes: "".to_owned(),
            date: date!(2024 - 01 - 15),
            payment_mode: PaymentMode::CreditCard,
            created_at: datetime!(2024-01-15 09:30:00 UTC),
        };

        let got = serde_json::to_value(&expense).unwrap();

        assert_eq!(
            got,
            json!({
                "id": 1,
                "amount": 12.5,
                "category": "Groceries",
                "notes": "",
                "date": "2024-01-15",
                "payment_mode": "Credit Card",
                "created_at": "2024-01-15T09:30:00Z",
            })
        );
    }
}
