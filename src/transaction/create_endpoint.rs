//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::Claims,
    cache::{CacheTag, ResponseCache},
    transaction::{
        core::{Transaction, create_transaction},
        TransactionKind,
    },
    user::get_user_by_id,
};

/// The state needed to create a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            response_cache: state.response_cache.clone(),
        }
    }
}

/// The form data for creating a transaction.
///
/// Every field except the note is required; the fields are options so that
/// a missing field produces a validation error instead of a rejected body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionForm {
    /// Whether this is income or an expense.
    pub kind: Option<TransactionKind>,
    /// The label to file the transaction under.
    pub category: Option<String>,
    /// The amount of money moved, non-negative.
    pub amount: Option<f64>,
    /// Optional free-form text about the transaction.
    #[serde(default)]
    pub note: Option<String>,
    /// The date the money actually moved.
    pub occurred_on: Option<Date>,
}

/// A route handler for recording a new transaction owned by the caller.
///
/// The owner is always the authenticated caller; it cannot be set through
/// the request body.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    claims: Claims,
    Json(form): Json<CreateTransactionForm>,
) -> Result<impl IntoResponse, Error> {
    let (Some(kind), Some(category), Some(amount), Some(occurred_on)) =
        (form.kind, form.category, form.amount, form.occurred_on)
    else {
        return Err(Error::Validation("missing required fields".to_owned()));
    };

    let transaction = {
        let connection = state.db_connection.lock().unwrap();

        // The token may outlive the account it was issued for.
        get_user_by_id(claims.sub, &connection)?;

        create_transaction(
            Transaction::build(claims.sub, kind, &category, amount, occurred_on)
                .note(form.note),
            &connection,
        )?
    };

    state.response_cache.invalidate(CacheTag::TransactionList);

    Ok((StatusCode::CREATED, Json(transaction)))
}
