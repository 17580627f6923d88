//! Defines the endpoint for listing transactions with pagination and totals.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;

use crate::{
    AppState, Error,
    auth::Claims,
    cache::{CacheTag, ResponseCache},
    pagination::{PageQuery, PaginationConfig},
    transaction::{
        core::Transaction,
        query::{TransactionScope, get_scope_totals, get_transaction_page},
    },
    user::get_user_by_id,
};

/// The state needed to list transactions.
#[derive(Clone)]
pub struct TransactionListState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to page listings.
    pub pagination_config: PaginationConfig,
    /// The cache for transaction listing responses.
    pub response_cache: Arc<ResponseCache>,
}

impl FromRef<AppState> for TransactionListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
            response_cache: state.response_cache.clone(),
        }
    }
}

/// One page of transactions plus the aggregate figures for the caller's
/// full scope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListing {
    /// The transactions on the requested page, newest first.
    pub items: Vec<Transaction>,
    /// How many transactions the caller can see in total.
    pub total_count: u64,
    /// The page that was returned.
    pub page: u64,
    /// The page size that was used.
    pub limit: u64,
    /// The income total over the caller's full scope.
    pub total_income: f64,
    /// The expense total over the caller's full scope.
    pub total_expense: f64,
    /// `total_income` minus `total_expense`.
    pub balance: f64,
}

/// A route handler for listing the transactions visible to the caller.
///
/// Admins and managers see every transaction; other callers see only their
/// own. The income/expense totals cover the caller's full scope, so paging
/// through the listing never changes them.
///
/// Responses are cached per scope and page; mutation endpoints drop the
/// affected entries.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionListState>,
    claims: Claims,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Value>, Error> {
    let (page, limit) = page_query.normalize(&state.pagination_config);
    let scope = TransactionScope::for_caller(claims.sub, claims.role);

    let cache_key = listing_cache_key(scope, page, limit);
    if let Some(cached) = state.response_cache.get(&cache_key) {
        return Ok(Json(cached));
    }

    let (items, totals) = {
        let connection = state.db_connection.lock().unwrap();

        // The token may outlive the account it was issued for.
        get_user_by_id(claims.sub, &connection)?;

        let items = get_transaction_page(scope, page, limit, &connection)?;
        let totals = get_scope_totals(scope, &connection)?;

        (items, totals)
    };

    let mut tags = vec![CacheTag::TransactionList];
    tags.extend(
        items
            .iter()
            .map(|transaction| CacheTag::Transaction(transaction.id)),
    );

    let listing = TransactionListing {
        total_count: totals.count,
        page,
        limit,
        total_income: totals.income,
        total_expense: totals.expense,
        balance: totals.balance(),
        items,
    };

    let value = serde_json::to_value(&listing)
        .map_err(|error| Error::JsonSerialization(error.to_string()))?;
    state.response_cache.insert(cache_key, tags, value.clone());

    Ok(Json(value))
}

fn listing_cache_key(scope: TransactionScope, page: u64, limit: u64) -> String {
    match scope {
        TransactionScope::All => format!("transactions:all:{page}:{limit}"),
        TransactionScope::OwnedBy(owner) => format!("transactions:{owner}:{page}:{limit}"),
    }
}
