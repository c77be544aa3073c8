use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_manager::{
    Category, Expense, PaymentMode, count_expenses, create_expense, initialize_db,
};

/// A utility for creating a test database for the REST API server of expense_manager.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many months of expenses to create, counting back from today.
    #[arg(long, short, default_value_t = 6)]
    months: u16,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test expenses...");

    let today = OffsetDateTime::now_utc().date();
    // One expense every third day, cycling through the categories and payment modes.
    for (i, days_ago) in (0..i64::from(args.months) * 30).step_by(3).enumerate() {
        let category = Category::ALL[i % Category::ALL.len()];
        let payment_mode = PaymentMode::ALL[i % PaymentMode::ALL.len()];
        let amount = 5.0 + (i % 17) as f64 * 12.5;
        let date = today - Duration::days(days_ago);

        create_expense(
            Expense::build(amount, category, date, payment_mode)
                .notes(&format!("Test {} expense #{}", category, i + 1)),
            &conn,
        )?;
    }

    println!("Created {} expenses.", count_expenses(&conn)?);
    println!("Success!");

    Ok(())
}
