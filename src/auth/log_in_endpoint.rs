//! Defines the endpoint that exchanges credentials for a signed auth token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{AppState, Error, auth::encode_token, user::get_user_by_email};

/// The state needed to log in a user.
#[derive(Clone)]
pub struct LogInState {
    /// Signs newly issued tokens.
    pub encoding_key: EncodingKey,
    /// The duration for which issued tokens are valid.
    pub token_duration: Duration,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            encoding_key: state.jwt_keys.encoding_key.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials for logging in a user.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email entered at log-in.
    pub email: String,
    /// Password entered at log-in.
    pub password: String,
}

/// A route handler that checks a user's credentials and returns a signed
/// auth token.
///
/// An unknown email and a wrong password produce the exact same error so
/// that the response does not reveal which accounts exist.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<String>, Error> {
    let user = {
        let connection = state.db_connection.lock().unwrap();

        get_user_by_email(&credentials.email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    if !user.password_hash.verify(&credentials.password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(&user, state.token_duration, &state.encoding_key)?;

    Ok(Json(token))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        AppState, PaginationConfig, build_router,
        auth::decode_token,
        password::PasswordHash,
        user::{NewUser, Role, create_user},
    };

    fn get_test_app_state() -> AppState {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        AppState::new(db_connection, "42", PaginationConfig::default())
            .expect("Could not create app state.")
    }

    fn create_test_user(state: &AppState, email: &str, password: &str) {
        let password_hash =
            PasswordHash::from_raw_password(password, 4).expect("Could not hash password");

        create_user(
            NewUser {
                name: "Test User".to_owned(),
                email: email.to_owned(),
                password_hash,
                role: Role::User,
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_app_state();
        create_test_user(&state, "foo@bar.baz", "averysafeandsecurepassword");
        let server = TestServer::new(build_router(state.clone()));

        let response = server
            .post("/api/log_in")
            .content_type("application/json")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status_ok();

        let token = response.json::<String>();
        let claims = decode_token(&token, &state.jwt_keys.decoding_key).unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_app_state();
        create_test_user(&state, "foo@bar.baz", "averysafeandsecurepassword");
        let server = TestServer::new(build_router(state));

        let response = server
            .post("/api/log_in")
            .content_type("application/json")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let state = get_test_app_state();
        create_test_user(&state, "foo@bar.baz", "averysafeandsecurepassword");
        let server = TestServer::new(build_router(state));

        let wrong_password_response = server
            .post("/api/log_in")
            .content_type("application/json")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await;

        let unknown_email_response = server
            .post("/api/log_in")
            .content_type("application/json")
            .json(&json!({
                "email": "nobody@nowhere.com",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await;

        assert_eq!(
            wrong_password_response.status_code(),
            unknown_email_response.status_code()
        );
        assert_eq!(
            wrong_password_response.text(),
            unknown_email_response.text(),
            "responses must not reveal whether the account exists"
        );
    }
}
