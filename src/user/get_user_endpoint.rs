//! Defines the endpoint for fetching a single user account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::DatabaseId,
    user::{User, UserID, core::get_user_by_id},
};

/// The state needed to look up a user account.
#[derive(Debug, Clone)]
pub struct GetUserState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for fetching a single account by its ID.
///
/// Callers may always fetch their own account; fetching someone else's
/// requires the admin or manager role.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_user_endpoint(
    State(state): State<GetUserState>,
    claims: Claims,
    Path(user_id): Path<DatabaseId>,
) -> Result<Json<User>, Error> {
    let user_id = UserID::new(user_id);

    if !claims.role.is_privileged() && claims.sub != user_id {
        return Err(Error::Forbidden);
    }

    let connection = state.db_connection.lock().unwrap();
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(user))
}

#[cfg(test)]
mod get_user_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;
    use time::Duration;

    use crate::{
        AppState, PaginationConfig, build_router,
        auth::encode_token,
        endpoints::{USER, format_endpoint},
        password::PasswordHash,
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

    #[tokio::test]
    async fn caller_can_fetch_their_own_account() {
        let state = get_test_app_state();
        let (user, token) = create_user_with_token(&state, "user@example.com", Role::User);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(&format_endpoint(USER, user.id.as_i64()))
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["email"], "user@example.com");
    }

    #[tokio::test]
    async fn non_privileged_caller_cannot_fetch_other_accounts() {
        let state = get_test_app_state();
        let (other, _) = create_user_with_token(&state, "other@example.com", Role::User);
        let (_, token) = create_user_with_token(&state, "user@example.com", Role::User);
        let server = TestServer::new(build_router(state));

        server
            .get(&format_endpoint(USER, other.id.as_i64()))
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn privileged_caller_can_fetch_any_account() {
        let state = get_test_app_state();
        let (user, _) = create_user_with_token(&state, "user@example.com", Role::User);
        let (_, admin_token) = create_user_with_token(&state, "admin@example.com", Role::Admin);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(&format_endpoint(USER, user.id.as_i64()))
            .authorization_bearer(admin_token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["email"], "user@example.com");
    }

    #[tokio::test]
    async fn unknown_account_gives_not_found() {
        let state = get_test_app_state();
        let (_, admin_token) = create_user_with_token(&state, "admin@example.com", Role::Admin);
        let server = TestServer::new(build_router(state));

        server
            .get(&format_endpoint(USER, 1337))
            .authorization_bearer(admin_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
