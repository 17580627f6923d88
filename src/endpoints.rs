//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/users/{user_id}', use
//! [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for exchanging credentials for an auth token.
pub const LOG_IN: &str = "/api/log_in";
/// The route to register and list user accounts.
pub const USERS: &str = "/api/users";
/// The route to access a single user account.
pub const USER: &str = "/api/users/{user_id}";
/// The route to change a user's role.
pub const USER_ROLE: &str = "/api/users/{user_id}/role";
/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the path parameter in `endpoint_path` with `id`.
///
/// A parameter is a string delimited by braces, for example '{user_id}' in
/// '/api/users/{user_id}'. This function assumes the path contains at most
/// one parameter; with no parameter the original path is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
