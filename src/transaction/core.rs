//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, database_id::TransactionId, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brought money in or sent it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The kind as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::Validation(format!(
                "invalid transaction kind \"{other}\""
            ))),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income or expense record.
///
/// The amount is a magnitude; the direction of the money flow comes from
/// `kind`. To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user who recorded the transaction.
    pub owner_id: UserID,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The label the owner filed the transaction under.
    pub category: String,
    /// The amount of money moved, always non-negative.
    pub amount: f64,
    /// Optional free-form text about the transaction.
    pub note: Option<String>,
    /// The date the money actually moved, as supplied by the owner. This is
    /// distinct from when the record was entered into the system.
    pub occurred_on: Date,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Start building a new transaction owned by `owner_id`.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        owner_id: UserID,
        kind: TransactionKind,
        category: &str,
        amount: f64,
        occurred_on: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            owner_id,
            kind,
            category: category.to_owned(),
            amount,
            note: None,
            occurred_on,
        }
    }
}

/// A builder for creating [Transaction] records.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The user the new transaction will belong to.
    pub owner_id: UserID,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The label to file the transaction under, e.g. "Groceries", "Salary".
    pub category: String,
    /// The amount of money moved. Must be non-negative; the direction of the
    /// flow is carried by `kind`, not by a sign.
    pub amount: f64,
    /// Optional free-form text about the transaction.
    pub note: Option<String>,
    /// The date the money actually moved.
    pub occurred_on: Date,
}

impl TransactionBuilder {
    /// Set the note for the transaction.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

/// The subset of transaction fields that can change after creation.
///
/// Fields left as `None` keep their stored value. The owner and the
/// creation timestamp are not caller-editable; `updated_at` is refreshed on
/// every successful update.
#[derive(Debug, Default, Clone)]
pub struct TransactionChanges {
    /// A new kind, if the entry should flip between income and expense.
    pub kind: Option<TransactionKind>,
    /// A new category label.
    pub category: Option<String>,
    /// A new amount. Must be non-negative.
    pub amount: Option<f64>,
    /// A new note.
    pub note: Option<String>,
    /// A new occurrence date.
    pub occurred_on: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the amount is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;

    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                    (owner_id, kind, category, amount, note, occurred_on, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, owner_id, kind, category, amount, note, occurred_on, created_at, updated_at",
        )?
        .query_row(
            (
                builder.owner_id.as_i64(),
                builder.kind.as_str(),
                &builder.category,
                builder.amount,
                &builder.note,
                builder.occurred_on,
                now,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, owner_id, kind, category, amount, note, occurred_on, created_at, updated_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Apply `changes` to the transaction `id` and return the updated record.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid
///   transaction,
/// - or [Error::Validation] if the new amount is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    changes: TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;

    let kind = changes.kind.unwrap_or(existing.kind);
    let category = changes.category.unwrap_or(existing.category);
    let amount = changes.amount.unwrap_or(existing.amount);
    let note = changes.note.or(existing.note);
    let occurred_on = changes.occurred_on.unwrap_or(existing.occurred_on);

    validate_amount(amount)?;

    let transaction = connection
        .prepare(
            "UPDATE \"transaction\"
             SET kind = ?1, category = ?2, amount = ?3, note = ?4, occurred_on = ?5, updated_at = ?6
             WHERE id = ?7
             RETURNING id, owner_id, kind, category, amount, note, occurred_on, created_at, updated_at",
        )?
        .query_row(
            (
                kind.as_str(),
                &category,
                amount,
                &note,
                occurred_on,
                OffsetDateTime::now_utc(),
                id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// How many rows a statement removed.
type RowsAffected = usize;

/// Delete the transaction `id`, returning how many rows were removed.
///
/// Callers decide how to report a zero count; the listing and mutation
/// endpoints translate it into the same not-found response as an unknown ID.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                note TEXT,
                occurred_on TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the owner-scoped listing and totals queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_created
         ON \"transaction\"(owner_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_kind: String = row.get(2)?;
    let kind = TransactionKind::from_str(&raw_kind).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown transaction kind \"{raw_kind}\"").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        kind,
        category: row.get(3)?,
        amount: row.get(4)?,
        note: row.get(5)?,
        occurred_on: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::Validation(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
