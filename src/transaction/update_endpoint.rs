//! Defines the endpoint for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::Claims,
    cache::{CacheTag, ResponseCache},
    database_id::TransactionId,
    transaction::{
        TransactionKind,
        core::{Transaction, TransactionChanges, get_transaction, update_transaction},
    },
};

/// The state needed to edit a transaction.
#[derive(Clone)]
pub struct UpdateTransactionState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            response_cache: state.response_cache.clone(),
        }
    }
}

/// The form data for editing a transaction. Absent fields keep their stored
/// value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionForm {
    /// A new kind, if the entry should flip between income and expense.
    pub kind: Option<TransactionKind>,
    /// A new category label.
    pub category: Option<String>,
    /// A new amount, non-negative.
    pub amount: Option<f64>,
    /// A new note.
    pub note: Option<String>,
    /// A new occurrence date.
    pub occurred_on: Option<Date>,
}

/// A route handler for editing a transaction, returning the full post-update
/// record.
///
/// Non-privileged callers can only edit their own transactions; a
/// transaction owned by someone else gets the exact same not-found response
/// as an ID that does not exist, so the caller cannot probe which IDs are
/// taken.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<UpdateTransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let updated = {
        let connection = state.db_connection.lock().unwrap();

        let existing = get_transaction(transaction_id, &connection).map_err(|error| {
            match error {
                Error::NotFound => Error::UpdateMissingTransaction,
                error => error,
            }
        })?;

        if !claims.role.is_privileged() && existing.owner_id != claims.sub {
            return Err(Error::UpdateMissingTransaction);
        }

        update_transaction(
            transaction_id,
            TransactionChanges {
                kind: form.kind,
                category: form.category,
                amount: form.amount,
                note: form.note,
                occurred_on: form.occurred_on,
            },
            &connection,
        )?
    };

    state
        .response_cache
        .invalidate(CacheTag::Transaction(transaction_id));
    state.response_cache.invalidate(CacheTag::TransactionList);

    Ok(Json(updated))
}

#[cfg(test)]
mod update_transaction_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::{Duration, macros::date};

    use crate::{
        AppState, PaginationConfig, build_router,
        auth::encode_token,
        database_id::TransactionId,
        endpoints::{TRANSACTION, format_endpoint},
        password::PasswordHash,
        transaction::{Transaction, TransactionKind, create_transaction},
        user::{NewUser, Role, User, create_user},
    };

    fn get_test_app_state() -> AppState {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        AppState::new(db_connection, "42", PaginationConfig::default())
            .expect("Could not create app state.")
    }

    fn create_user_with_token(state: &AppState, email: &str, role: Role) -> (User, String) {
        let user = create_user(
            NewUser {
                name: "Test User".to_owned(),
                email: email.to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                role,
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");

        let token = encode_token(&user, Duration::minutes(15), &state.jwt_keys.encoding_key)
            .expect("Could not create token");

        (user, token)
    }

    fn insert_transaction(state: &AppState, owner: &User) -> TransactionId {
        let connection = state.db_connection.lock().unwrap();

        create_transaction(
            Transaction::build(
                owner.id,
                TransactionKind::Expense,
                "Groceries",
                42.5,
                date!(2025 - 01 - 05),
            ),
            &connection,
        )
        .expect("Could not create transaction")
        .id
    }

    #[tokio::test]
    async fn owner_can_update_their_transaction() {
        let state = get_test_app_state();
        let (user, token) = create_user_with_token(&state, "user@example.com", Role::User);
        let transaction_id = insert_transaction(&state, &user);
        let server = TestServer::new(build_router(state));

        let response = server
            .put(&format_endpoint(TRANSACTION, transaction_id))
            .authorization_bearer(token)
            .content_type("application/json")
            .json(&json!({
                "amount": 50.0,
                "category": "Food",
            }))
            .await;

        response.assert_status_ok();

        let transaction = response.json::<Value>();
        assert_eq!(transaction["amount"], 50.0);
        assert_eq!(transaction["category"], "Food");
        // Untouched fields keep their values.
        assert_eq!(transaction["kind"], "expense");
        assert_eq!(transaction["occurredOn"], "2025-01-05");
    }

    #[tokio::test]
    async fn update_is_reflected_in_the_listing() {
        let state = get_test_app_state();
        let (user, token) = create_user_with_token(&state, "user@example.com", Role::User);
        let transaction_id = insert_transaction(&state, &user);
        let server = TestServer::new(build_router(state));

        // Prime the cache before mutating.
        server
            .get("/api/transactions")
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        server
            .put(&format_endpoint(TRANSACTION, transaction_id))
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "amount": 99.0 }))
            .await
            .assert_status_ok();

        let listing = server
            .get("/api/transactions")
            .authorization_bearer(&token)
            .await
            .json::<Value>();

        assert_eq!(listing["items"][0]["amount"], 99.0);
        assert_eq!(listing["totalExpense"], 99.0);
    }

    #[tokio::test]
    async fn another_users_transaction_is_indistinguishable_from_a_missing_one() {
        let state = get_test_app_state();
        let (owner, _) = create_user_with_token(&state, "owner@example.com", Role::User);
        let (_, intruder_token) =
            create_user_with_token(&state, "intruder@example.com", Role::User);
        let transaction_id = insert_transaction(&state, &owner);
        let server = TestServer::new(build_router(state));

        let foreign_response = server
            .put(&format_endpoint(TRANSACTION, transaction_id))
            .authorization_bearer(&intruder_token)
            .content_type("application/json")
            .json(&json!({ "amount": 1.0 }))
            .await;

        let missing_response = server
            .put(&format_endpoint(TRANSACTION, 1337))
            .authorization_bearer(&intruder_token)
            .content_type("application/json")
            .json(&json!({ "amount": 1.0 }))
            .await;

        foreign_response.assert_status(StatusCode::NOT_FOUND);
        missing_response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            foreign_response.text(),
            missing_response.text(),
            "the response must not reveal that the transaction exists"
        );
    }

    #[tokio::test]
    async fn privileged_caller_can_update_any_transaction() {
        let state = get_test_app_state();
        let (owner, _) = create_user_with_token(&state, "owner@example.com", Role::User);
        let (_, admin_token) = create_user_with_token(&state, "admin@example.com", Role::Admin);
        let transaction_id = insert_transaction(&state, &owner);
        let server = TestServer::new(build_router(state));

        let response = server
            .put(&format_endpoint(TRANSACTION, transaction_id))
            .authorization_bearer(admin_token)
            .content_type("application/json")
            .json(&json!({ "note": "checked by admin" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["note"], "checked by admin");
    }

    #[tokio::test]
    async fn update_fails_with_negative_amount() {
        let state = get_test_app_state();
        let (user, token) = create_user_with_token(&state, "user@example.com", Role::User);
        let transaction_id = insert_transaction(&state, &user);
        let server = TestServer::new(build_router(state));

        server
            .put(&format_endpoint(TRANSACTION, transaction_id))
            .authorization_bearer(token)
            .content_type("application/json")
            .json(&json!({ "amount": -5.0 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
