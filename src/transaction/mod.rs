//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, `TransactionKind` enum, and `TransactionBuilder`
//! - Database functions for storing, querying, and aggregating transactions
//! - Route handlers for the listing and mutation endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod query;
mod update_endpoint;

pub use core::{Transaction, TransactionKind, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use update_endpoint::update_transaction_endpoint;

#[cfg(test)]
pub use core::create_transaction;
