//! Database initialization for the application's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table, user::create_user_table};

/// Create the application tables if they do not already exist.
///
/// # Errors
/// Returns an error if a table cannot be created or the schema transaction
/// cannot be committed.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite leaves foreign keys unenforced unless the pragma is set, and the
    // pragma is a no-op inside a transaction.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
