//! Authentication for the API: password log-in and bearer-token verification.

mod claims;
mod log_in_endpoint;

pub use claims::{AuthState, Claims, decode_token, encode_token};
pub use log_in_endpoint::{Credentials, log_in_endpoint};
