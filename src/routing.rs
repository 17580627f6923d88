//! Application router configuration.
//!
//! Authentication is enforced per handler through the [crate::auth::Claims]
//! extractor, so a route is protected simply by taking `claims: Claims` as
//! an argument.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};

use crate::{
    AppState,
    auth::log_in_endpoint,
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        update_transaction_endpoint,
    },
    user::{
        delete_user_endpoint, get_user_endpoint, list_users_endpoint, register_user_endpoint,
        set_role_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(
            endpoints::USERS,
            post(register_user_endpoint).get(list_users_endpoint),
        )
        .route(
            endpoints::USER,
            get(get_user_endpoint).delete(delete_user_endpoint),
        )
        .route(endpoints::USER_ROLE, patch(set_role_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    StatusCode::IM_A_TEAPOT.into_response()
}
