use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use finance_api::{NewTransaction, count_transactions, create_transaction, initialize_db};

/// A utility for creating a test database for the finance API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of sample transactions to insert.
    #[arg(long, short, default_value_t = 20)]
    count: usize,
}

const CATEGORIES: [&str; 5] = ["groceries", "rent", "transport", "entertainment", "salary"];

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

    println!("Creating {} sample transactions...", args.count);

    for i in 0..args.count {
        create_transaction(sample_transaction(i), &conn)?;
    }

    println!(
        "Success! The database contains {} transactions.",
        count_transactions(&conn)?
    );

    Ok(())
}

/// Build the `i`-th sample transaction.
///
/// Every fifth transaction is a salary payment, the rest are expenses.
fn sample_transaction(i: usize) -> NewTransaction {
    let category = CATEGORIES[i % CATEGORIES.len()];
    let is_income = category == "salary";
    let amount = if is_income {
        2500.0
    } else {
        -((i % 9 + 1) as f64 * 12.5)
    };

    NewTransaction {
        amount,
        category: category.to_owned(),
        description: format!("Sample {category} transaction #{}", i + 1),
        is_income,
        date: format!("2024-01-{:02}", i % 28 + 1),
    }
}
