//! Fintrack is a JSON HTTP API for tracking personal and team finances.
//!
//! Users sign in with an email/password pair and receive a signed bearer
//! token. With it they can record income and expense transactions and read
//! paginated listings that include income, expense, and balance totals over
//! everything they are allowed to see. Admins and managers see every user's
//! records; regular users see only their own.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod cache;
mod database_id;
mod db;
pub mod endpoints;
mod error;
mod logging;
mod pagination;
mod password;
mod routing;
mod transaction;
pub mod user;

pub use app_state::{AppState, DEFAULT_TOKEN_DURATION, JwtKeys};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
