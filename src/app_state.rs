//! Implements a struct that holds the state of the API server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{
    Error, cache::ResponseCache, db::initialize, pagination::PaginationConfig,
    password::PasswordHash,
};

/// How long a signed auth token stays valid after issuance.
///
/// Tokens carry the role the user held when they logged in, so a short
/// lifetime also bounds how long a role change can go unnoticed.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::minutes(15);

/// The signing and verification keys for auth tokens.
#[derive(Clone)]
pub struct JwtKeys {
    /// Signs newly issued tokens.
    pub encoding_key: EncodingKey,
    /// Verifies tokens on incoming requests.
    pub decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Derive the token key pair from a secret string.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// The state of the API server.
#[derive(Clone)]
pub struct AppState {
    /// The keys for signing and verifying auth tokens.
    pub jwt_keys: JwtKeys,

    /// The duration for which issued auth tokens are valid.
    pub token_duration: Duration,

    /// The bcrypt cost used when hashing new passwords.
    pub hash_cost: u32,

    /// The config that controls how to page listings.
    pub pagination_config: PaginationConfig,

    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,

    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            jwt_keys: JwtKeys::new(jwt_secret),
            token_duration: DEFAULT_TOKEN_DURATION,
            hash_cost: PasswordHash::DEFAULT_COST,
            pagination_config,
            response_cache: Arc::new(ResponseCache::default()),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
