//! Defines the endpoint for registering a new user account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    password::PasswordHash,
    user::{NewUser, Role, core::create_user},
};

/// The state needed to register a user.
#[derive(Clone)]
pub struct RegisterUserState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used for hashing new passwords.
    pub hash_cost: u32,
}

impl FromRef<AppState> for RegisterUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            hash_cost: state.hash_cost,
        }
    }
}

/// The registration form for a new account.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The display name for the account.
    pub name: Option<String>,
    /// The email address used to log in.
    pub email: Option<String>,
    /// The plain-text password, checked for strength before hashing.
    pub password: Option<String>,
}

/// A route handler for registering a new user account.
///
/// New accounts always start with the `user` role; roles can only be raised
/// afterwards by an admin or manager through the role endpoint.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn register_user_endpoint(
    State(state): State<RegisterUserState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, Error> {
    let (Some(name), Some(email), Some(password)) = (form.name, form.email, form.password) else {
        return Err(Error::Validation("missing required fields".to_owned()));
    };

    if EmailAddress::from_str(&email).is_err() {
        return Err(Error::Validation(format!(
            "\"{email}\" is not a valid email address"
        )));
    }

    let password_hash = PasswordHash::from_raw_password(&password, state.hash_cost)?;

    let connection = state.db_connection.lock().unwrap();
    let user = create_user(
        NewUser {
            name,
            email,
            password_hash,
            role: Role::User,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(user)))
}
