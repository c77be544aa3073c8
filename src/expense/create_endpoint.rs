//! Defines the endpoint for creating a new expense.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{
    Error,
    expense::{
        ExpenseState,
        core::{Category, Expense, NewExpense, PaymentMode, create_expense},
    },
};

/// The message sent when a required field is missing.
pub const MISSING_FIELDS_MESSAGE: &str =
    "All required fields must be provided: amount, category, date, payment_mode";

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// An amount as sent by the client, either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// A JSON number, e.g. `12.5`.
    Number(f64),
    /// A number in a string, e.g. `"12.5"`.
    Text(String),
}

/// The JSON body for creating an expense.
///
/// Required fields are optional here so that a missing field can be reported
/// with [MISSING_FIELDS_MESSAGE]. The category and payment mode are still
/// checked against their enumerations while parsing the body.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ExpenseForm {
    /// The amount of money spent.
    pub amount: Option<AmountInput>,
    /// What the money was spent on.
    pub category: Option<Category>,
    /// Free text about the expense.
    pub notes: Option<String>,
    /// When the money was spent, as `YYYY-MM-DD` or an RFC 3339 date-time.
    pub date: Option<String>,
    /// How the expense was paid for.
    pub payment_mode: Option<PaymentMode>,
}

impl TryFrom<ExpenseForm> for NewExpense {
    type Error = Error;

    fn try_from(form: ExpenseForm) -> Result<Self, Self::Error> {
        let (Some(amount), Some(category), Some(date), Some(payment_mode)) =
            (form.amount, form.category, form.date, form.payment_mode)
        else {
            return Err(missing_fields());
        };

        if date.is_empty() {
            return Err(missing_fields());
        }

        let amount = parse_amount(amount)?;

        // A zero amount counts as not provided.
        if amount == 0.0 {
            return Err(missing_fields());
        }

        Ok(NewExpense {
            amount,
            category,
            notes: form.notes.unwrap_or_default(),
            date: parse_date(&date)?,
            payment_mode,
        })
    }
}

fn missing_fields() -> Error {
    Error::InvalidExpense(MISSING_FIELDS_MESSAGE.to_owned())
}

fn parse_amount(amount: AmountInput) -> Result<f64, Error> {
    match amount {
        AmountInput::Number(number) => Ok(number),
        AmountInput::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| Error::InvalidExpense(format!("\"{text}\" is not a valid amount"))),
    }
}

/// Parse a date given either as a calendar date or as an RFC 3339 date-time.
///
/// Date-times are converted to UTC before taking the date. Only years 0 to
/// 9999 are accepted so that dates keep their `YYYY-MM-DD` form.
fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, DATE_FORMAT)
        .or_else(|_| {
            OffsetDateTime::parse(text, &Rfc3339)
                .map(|date_time| date_time.to_offset(UtcOffset::UTC).date())
        })
        .ok()
        .filter(|date| (0..=9999).contains(&date.year()))
        .ok_or_else(|| Error::InvalidExpense(format!("\"{text}\" is not a valid date")))
}

/// A route handler for creating a new expense.
///
/// Responds with the stored expense and `201 Created`.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    payload: Result<Json<ExpenseForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let Json(form) = payload?;
    let new_expense = NewExpense::try_from(form)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = create_expense(new_expense, &connection)?;
    tracing::debug!("Created expense {}", expense.id);

    Ok((StatusCode::CREATED, Json(expense)))
}

#[cfg(test)]
mod form_tests {
    use time::macros::date;

    use crate::{
        Error,
        expense::{Category, NewExpense, PaymentMode},
    };

    use super::{AmountInput, ExpenseForm, MISSING_FIELDS_MESSAGE};

    fn valid_form() -> ExpenseForm {
        ExpenseForm {
            amount: Some(AmountInput::Number(12.5)),
            category: Some(Category::Groceries),
            notes: Some("bread".to_owned()),
            date: Some("2024-01-15".to_owned()),
            payment_mode: Some(PaymentMode::Cash),
        }
    }

    fn missing_fields_error() -> Error {
        Error::InvalidExpense(MISSING_FIELDS_MESSAGE.to_owned())
    }

    #[test]
    fn valid_form_converts() {
        let got = NewExpense::try_from(valid_form());

        assert_eq!(
            got,
            Ok(NewExpense {
                amount: 12.5,
                category: Category::Groceries,
                notes: "bread".to_owned(),
                date: date!(2024 - 01 - 15),
                payment_mode: PaymentMode::Cash,
            })
        );
    }

    #[test]
    fn missing_required_fields_fail() {
        let forms = [
            ExpenseForm {
                amount: None,
                ..valid_form()
            },
            ExpenseForm {
                category: None,
                ..valid_form()
            },
            ExpenseForm {
                date: None,
                ..valid_form()
            },
            ExpenseForm {
                payment_mode: None,
                ..valid_form()
            },
        ];

        for form in forms {
            let description = format!("{form:?}");

            assert_eq!(
                NewExpense::try_from(form),
                Err(missing_fields_error()),
                "{description}"
            );
        }
    }

    #[test]
    fn missing_notes_default_to_empty() {
        let form = ExpenseForm {
            notes: None,
            ..valid_form()
        };

        let got = NewExpense::try_from(form).unwrap();

        assert_eq!(got.notes, "");
    }

    #[test]
    fn zero_amount_counts_as_missing() {
        let form = ExpenseForm {
            amount: Some(AmountInput::Number(0.0)),
            ..valid_form()
        };

        assert_eq!(NewExpense::try_from(form), Err(missing_fields_error()));
    }

    #[test]
    fn empty_date_counts_as_missing() {
        let form = ExpenseForm {
            date: Some("".to_owned()),
            ..valid_form()
        };

        assert_eq!(NewExpense::try_from(form), Err(missing_fields_error()));
    }

    #[test]
    fn negative_amount_is_accepted() {
        let form = ExpenseForm {
            amount: Some(AmountInput::Number(-20.0)),
            ..valid_form()
        };

        assert_eq!(NewExpense::try_from(form).unwrap().amount, -20.0);
    }

    #[test]
    fn numeric_string_amount_is_coerced() {
        let form = ExpenseForm {
            amount: Some(AmountInput::Text(" 42.75 ".to_owned())),
            ..valid_form()
        };

        assert_eq!(NewExpense::try_from(form).unwrap().amount, 42.75);
    }

    #[test]
    fn non_numeric_string_amount_fails() {
        for text in ["twelve", "NaN", "inf", ""] {
            let form = ExpenseForm {
                amount: Some(AmountInput::Text(text.to_owned())),
                ..valid_form()
            };

            assert!(
                matches!(NewExpense::try_from(form), Err(Error::InvalidExpense(_))),
                "\"{text}\" should not be a valid amount"
            );
        }
    }

    #[test]
    fn date_time_is_converted_to_utc_date() {
        let form = ExpenseForm {
            date: Some("2024-01-15T23:30:00-02:00".to_owned()),
            ..valid_form()
        };

        assert_eq!(
            NewExpense::try_from(form).unwrap().date,
            date!(2024 - 01 - 16)
        );
    }

    #[test]
    fn invalid_date_fails() {
        for text in [
            "2024-02-30",
            "15/01/2024",
            "yesterday",
            "-0001-06-15",
            "+10000-01-01",
            "0000-01-01T00:00:00+01:00",
        ] {
            let form = ExpenseForm {
                date: Some(text.to_owned()),
                ..valid_form()
            };

            assert_eq!(
                NewExpense::try_from(form),
                Err(Error::InvalidExpense(format!("\"{text}\" is not a valid date")))
            );
        }
    }

    #[test]
    fn form_rejects_unknown_enum_values() {
        let body = r#"{"amount": 1, "category": "Utilities", "date": "2024-01-15", "payment_mode": "Cash"}"#;

        assert!(serde_json::from_str::<ExpenseForm>(body).is_err());

        let body = r#"{"amount": 1, "category": "Rental", "date": "2024-01-15", "payment_mode": "Cheque"}"#;

        assert!(serde_json::from_str::<ExpenseForm>(body).is_err());
    }

    #[test]
    fn form_treats_null_as_missing() {
        let body = r#"{"amount": null, "category": "Rental", "date": "2024-01-15", "payment_mode": "Cash"}"#;

        let form = serde_json::from_str::<ExpenseForm>(body).unwrap();

        assert_eq!(NewExpense::try_from(form), Err(missing_fields_error()));
    }
}

#[cfg(test)]
mod endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        db::initialize,
        expense::{Category, ExpenseState, PaymentMode, count_expenses, get_expense},
    };

    use super::{AmountInput, ExpenseForm, MISSING_FIELDS_MESSAGE, create_expense_endpoint};

    fn get_test_state() -> ExpenseState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ExpenseState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let state = get_test_state();
        let form = ExpenseForm {
            amount: Some(AmountInput::Number(12.3)),
            category: Some(Category::Travel),
            notes: Some("bus".to_owned()),
            date: Some("2025-10-01".to_owned()),
            payment_mode: Some(PaymentMode::Upi),
        };

        let (status, Json(expense)) = create_expense_endpoint(State(state.clone()), Ok(Json(form)))
            .await
            .expect("Could not create expense");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(expense.amount, 12.3);
        assert_eq!(expense.category, Category::Travel);
        assert_eq!(expense.notes, "bus");
        assert_eq!(expense.date, date!(2025 - 10 - 01));
        assert_eq!(expense.payment_mode, PaymentMode::Upi);
        assert!(expense.created_at <= OffsetDateTime::now_utc());

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, &connection), Ok(expense));
    }

    #[tokio::test]
    async fn missing_field_is_not_saved() {
        let state = get_test_state();
        let form = ExpenseForm {
            amount: Some(AmountInput::Number(12.3)),
            category: Some(Category::Travel),
            notes: None,
            date: None,
            payment_mode: Some(PaymentMode::Upi),
        };

        let result = create_expense_endpoint(State(state.clone()), Ok(Json(form))).await;

        assert_eq!(
            result.err(),
            Some(Error::InvalidExpense(MISSING_FIELDS_MESSAGE.to_owned()))
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_expenses(&connection), Ok(0));
    }
}
