//! Defines the endpoint for changing a user's role.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    cache::{CacheTag, ResponseCache},
    database_id::DatabaseId,
    user::{Role, User, UserID, core::set_user_role},
};

/// The state needed to change a user's role.
#[derive(Clone)]
pub struct SetRoleState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,
}

impl FromRef<AppState> for SetRoleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            response_cache: state.response_cache.clone(),
        }
    }
}

/// The form data for changing a role.
#[derive(Debug, Deserialize)]
pub struct SetRoleForm {
    /// The new role name.
    pub role: Option<String>,
}

/// A route handler for changing the role of the user `user_id`.
///
/// Only admins and managers may change roles. The new role takes effect for
/// API calls once the target user obtains a fresh auth token; tokens issued
/// before the change keep the old role until they expire.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn set_role_endpoint(
    State(state): State<SetRoleState>,
    claims: Claims,
    Path(user_id): Path<DatabaseId>,
    Json(form): Json<SetRoleForm>,
) -> Result<Json<User>, Error> {
    if !claims.role.is_privileged() {
        return Err(Error::Forbidden);
    }

    let Some(raw_role) = form.role else {
        return Err(Error::Validation(
            "missing required field \"role\"".to_owned(),
        ));
    };
    let role = Role::from_str(&raw_role)?;

    let user = {
        let connection = state.db_connection.lock().unwrap();
        set_user_role(UserID::new(user_id), role, &connection)?
    };

    // A role change widens or narrows which transactions the user can see.
    state.response_cache.invalidate(CacheTag::TransactionList);

    Ok(Json(user))
}
