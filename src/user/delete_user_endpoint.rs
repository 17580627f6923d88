//! Defines the endpoint for deleting a user account.

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
    database_id::DatabaseId,
    user::{UserID, core::delete_user},
};

/// The state needed to delete a user account.
#[derive(Clone)]
pub struct DeleteUserState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,
}

impl FromRef<AppState> for DeleteUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            response_cache: state.response_cache.clone(),
        }
    }
}

/// A route handler for deleting an account by its ID.
///
/// Only admins and managers may delete accounts. Deleting an account also
/// removes the transactions it owns, so cached listings are dropped.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn delete_user_endpoint(
    State(state): State<DeleteUserState>,
    claims: Claims,
    Path(user_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    if !claims.role.is_privileged() {
        return Err(Error::Forbidden);
    }

    {
        let connection = state.db_connection.lock().unwrap();
        delete_user(UserID::new(user_id), &connection)?;
    }

    state.response_cache.invalidate(CacheTag::TransactionList);

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod delete_user_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        AppState, PaginationConfig, build_router,
        auth::encode_token,
        endpoints::{USER, format_endpoint},
        password::PasswordHash,
        user::{NewUser, Role, User, create_user, get_user_by_id},
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

    #[tokio::test]
    async fn admin_can_delete_an_account() {
        let state = get_test_app_state();
        let (user, _) = create_user_with_token(&state, "user@example.com", Role::User);
        let (_, admin_token) = create_user_with_token(&state, "admin@example.com", Role::Admin);
        let server = TestServer::new(build_router(state.clone()));

        let response = server
            .delete(&format_endpoint(USER, user.id.as_i64()))
            .authorization_bearer(admin_token)
            .await;

        response.assert_status_ok();

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_id(user.id, &connection).is_err());
    }

    #[tokio::test]
    async fn non_privileged_caller_cannot_delete_accounts() {
        let state = get_test_app_state();
        let (other, _) = create_user_with_token(&state, "other@example.com", Role::User);
        let (_, token) = create_user_with_token(&state, "user@example.com", Role::User);
        let server = TestServer::new(build_router(state));

        server
            .delete(&format_endpoint(USER, other.id.as_i64()))
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deleting_an_unknown_account_gives_not_found() {
        let state = get_test_app_state();
        let (_, admin_token) = create_user_with_token(&state, "admin@example.com", Role::Admin);
        let server = TestServer::new(build_router(state));

        server
            .delete(&format_endpoint(USER, 1337))
            .authorization_bearer(admin_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
