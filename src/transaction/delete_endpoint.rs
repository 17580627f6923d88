//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::Claims,
    cache::{CacheTag, ResponseCache},
    database_id::TransactionId,
    transaction::core::{delete_transaction, get_transaction},
};

/// The state needed to delete a transaction.
#[derive(Clone)]
pub struct DeleteTransactionState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            response_cache: state.response_cache.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Non-privileged callers can only delete their own transactions; a
/// transaction owned by someone else gets the exact same not-found response
/// as an ID that does not exist, so the caller cannot probe which IDs are
/// taken.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    {
        let connection = state.db_connection.lock().unwrap();

        let existing = get_transaction(transaction_id, &connection).map_err(|error| {
            match error {
                Error::NotFound => Error::DeleteMissingTransaction,
                error => error,
            }
        })?;

        if !claims.role.is_privileged() && existing.owner_id != claims.sub {
            return Err(Error::DeleteMissingTransaction);
        }

        if delete_transaction(transaction_id, &connection)? == 0 {
            return Err(Error::DeleteMissingTransaction);
        }
    }

    state
        .response_cache
        .invalidate(CacheTag::Transaction(transaction_id));
    state.response_cache.invalidate(CacheTag::TransactionList);

    Ok(Json(json!({ "success": true })))
}
