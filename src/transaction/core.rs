//! Defines the core data models and database queries for transactions.

use std::fmt;

use rusqlite::{Connection, Row};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// The data needed to record a new transaction.
///
/// This is the shape accepted by the API when creating a transaction. It has
/// no ID, the database assigns one when the transaction is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The amount of money spent or earned.
    ///
    /// Accepts either a JSON number or a string containing a number, since
    /// HTML form inputs submit their values as text.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    /// A free text label for grouping transactions, e.g. "groceries".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether money was earned (`true`) or spent (`false`).
    pub is_income: bool,
    /// When the transaction happened.
    ///
    /// The date is stored exactly as given and is not checked for calendar
    /// correctness.
    pub date: String,
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A free text label for grouping transactions.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether money was earned (`true`) or spent (`false`).
    pub is_income: bool,
    /// When the transaction happened.
    pub date: String,
}

impl Transaction {
    /// Combine a [NewTransaction] with the `id` the database assigned to it.
    pub fn from_new(id: TransactionId, new_transaction: NewTransaction) -> Self {
        let NewTransaction {
            amount,
            category,
            description,
            is_income,
            date,
        } = new_transaction;

        Self {
            id,
            amount,
            category,
            description,
            is_income,
            date,
        }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a string containing a number")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(value), &self))
            }
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value as f64)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value as f64)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let amount = value
                .trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))?;

            self.visit_f64(amount)
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a new transaction in the database.
///
/// The insert runs as a single statement, so it is committed as soon as this
/// function returns successfully.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let id = connection
        .prepare(
            "INSERT INTO transactions (amount, category, description, is_income, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            (
                new_transaction.amount,
                &new_transaction.category,
                &new_transaction.description,
                new_transaction.is_income,
                &new_transaction.date,
            ),
            |row| row.get(0),
        )?;

    Ok(Transaction::from_new(id, new_transaction))
}

/// Get a page of transactions ordered by ID, oldest first.
///
/// The first `skip` transactions are skipped and at most `limit` transactions
/// are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    skip: u64,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // SQLite integers are signed, values past i64::MAX mean "everything" anyway.
    let skip = i64::try_from(skip).unwrap_or(i64::MAX);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    connection
        .prepare(
            "SELECT id, amount, category, description, is_income, date
             FROM transactions
             ORDER BY id ASC
             LIMIT :limit OFFSET :skip",
        )?
        .query_map(&[(":limit", &limit), (":skip", &skip)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                is_income INTEGER NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let category = row.get(2)?;
    let description = row.get(3)?;
    let is_income = row.get(4)?;
    let date = row.get(5)?;

    Ok(Transaction {
        id,
        amount,
        category,
        description,
        is_income,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use serde_json::json;

    use super::{NewTransaction, Transaction};

    fn groceries() -> NewTransaction {
        NewTransaction {
            amount: -42.5,
            category: "groceries".to_owned(),
            description: "weekly shop".to_owned(),
            is_income: false,
            date: "2024-01-15".to_owned(),
        }
    }

    #[test]
    fn from_new_keeps_all_fields() {
        let transaction = Transaction::from_new(7, groceries());

        assert_eq!(
            transaction,
            Transaction {
                id: 7,
                amount: -42.5,
                category: "groceries".to_owned(),
                description: "weekly shop".to_owned(),
                is_income: false,
                date: "2024-01-15".to_owned(),
            }
        );
    }

    #[test]
    fn amount_accepts_numeric_string() {
        let new_transaction: NewTransaction = serde_json::from_value(json!({
            "amount": " -42.50 ",
            "category": "groceries",
            "description": "weekly shop",
            "is_income": false,
            "date": "2024-01-15"
        }))
        .expect("Could not deserialize transaction");

        assert_eq!(new_transaction, groceries());
    }

    #[test]
    fn amount_accepts_integer() {
        let new_transaction: NewTransaction = serde_json::from_value(json!({
            "amount": 100,
            "category": "salary",
            "description": "pay day",
            "is_income": true,
            "date": "2024-01-31"
        }))
        .expect("Could not deserialize transaction");

        assert_eq!(new_transaction.amount, 100.0);
    }

    #[test]
    fn amount_rejects_non_numeric_string() {
        let result = serde_json::from_value::<NewTransaction>(json!({
            "amount": "lots",
            "category": "groceries",
            "description": "weekly shop",
            "is_income": false,
            "date": "2024-01-15"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn amount_rejects_non_finite_string() {
        for amount in ["NaN", "inf", "-infinity"] {
            let result = serde_json::from_value::<NewTransaction>(json!({
                "amount": amount,
                "category": "groceries",
                "description": "weekly shop",
                "is_income": false,
                "date": "2024-01-15"
            }));

            assert!(result.is_err(), "want error for amount {amount:?}");
        }
    }

    #[test]
    fn missing_field_is_rejected() {
        let result = serde_json::from_value::<NewTransaction>(json!({
            "category": "groceries",
            "description": "weekly shop",
            "is_income": false,
            "date": "2024-01-15"
        }));

        let error = result.expect_err("want error for missing amount");
        assert!(error.to_string().contains("amount"), "got {error}");
    }

    #[test]
    fn serializes_with_api_field_names() {
        let value = serde_json::to_value(Transaction::from_new(1, groceries())).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "amount": -42.5,
                "category": "groceries",
                "description": "weekly shop",
                "is_income": false,
                "date": "2024-01-15"
            })
        );
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::db::initialize;

    use super::{
        NewTransaction, Transaction, count_transactions, create_transaction, list_transactions,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(amount: f64) -> NewTransaction {
        NewTransaction {
            amount,
            category: "test".to_owned(),
            description: format!("transaction for {amount}"),
            is_income: amount > 0.0,
            date: "2024-01-15".to_owned(),
        }
    }

    fn create_many(count: usize, conn: &Connection) -> Vec<Transaction> {
        (1..=count)
            .map(|i| {
                create_transaction(new_transaction(i as f64), conn)
                    .expect("Could not create transaction")
            })
            .collect()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let want = new_transaction(-12.3);

        let got = create_transaction(want.clone(), &conn).expect("Could not create transaction");

        assert_eq!(got, Transaction::from_new(1, want));
    }

    #[test]
    fn create_assigns_increasing_ids_to_identical_transactions() {
        let conn = get_test_connection();

        let first = create_transaction(new_transaction(5.0), &conn).unwrap();
        let second = create_transaction(new_transaction(5.0), &conn).unwrap();

        assert!(first.id > 0);
        assert!(
            second.id > first.id,
            "got IDs {} and {}, want strictly increasing IDs",
            first.id,
            second.id
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = get_test_connection();
        let first = create_transaction(new_transaction(1.0), &conn).unwrap();
        conn.execute("DELETE FROM transactions WHERE id = ?1", (first.id,))
            .unwrap();

        let second = create_transaction(new_transaction(1.0), &conn).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn list_returns_transactions_in_id_order() {
        let conn = get_test_connection();
        let want = create_many(5, &conn);

        let got = list_transactions(0, 100, &conn).expect("Could not list transactions");

        assert_eq!(got, want);
    }

    #[test]
    fn list_with_empty_table_returns_empty_vec() {
        let conn = get_test_connection();

        let got = list_transactions(0, 100, &conn).expect("Could not list transactions");

        assert!(got.is_empty());
    }

    #[test]
    fn list_applies_skip_and_limit() {
        let conn = get_test_connection();
        let all = create_many(10, &conn);

        let cases = [(0, 3), (3, 3), (8, 5), (10, 5), (15, 5), (2, 0)];

        for (skip, limit) in cases {
            let got = list_transactions(skip, limit, &conn).expect("Could not list transactions");

            let start = (skip as usize).min(all.len());
            let end = (start + limit as usize).min(all.len());
            assert_eq!(got, all[start..end], "skip={skip}, limit={limit}");
        }
    }

    #[test]
    fn list_saturates_huge_values() {
        let conn = get_test_connection();
        let all = create_many(3, &conn);

        let got = list_transactions(0, u64::MAX, &conn).expect("Could not list transactions");
        assert_eq!(got, all);

        let got = list_transactions(u64::MAX, 10, &conn).expect("Could not list transactions");
        assert!(got.is_empty());
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let want_count = 20;
        create_many(want_count, &conn);

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count as u32, got_count);
    }
}
