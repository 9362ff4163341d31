//! Transaction management for the finance API.
//!
//! This module contains everything related to transactions:
//! - The `NewTransaction` and `Transaction` models
//! - Database functions for storing and listing transactions
//! - Route handlers for creating and listing transactions

mod core;
mod create_endpoint;
mod list_endpoint;

pub use self::core::{
    NewTransaction, Transaction, count_transactions, create_transaction, create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
