//! Defines the endpoint for listing transactions a page at a time.

use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    db::ConnectionProvider,
    pagination::{PaginationConfig, PaginationQuery},
    transaction::{Transaction, core::list_transactions},
};

/// A route handler for listing transactions, oldest first.
///
/// The query parameters `skip` and `limit` select the page of transactions.
pub async fn list_transactions_endpoint(
    State(connection_provider): State<ConnectionProvider>,
    State(pagination_config): State<PaginationConfig>,
    WithRejection(Query(query), _): WithRejection<Query<PaginationQuery>, Error>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let page = query.resolve(&pagination_config);

    let connection = connection_provider.acquire()?;

    let transactions = list_transactions(page.skip, page.limit, &connection)?;

    tracing::debug!(
        "listing {} transactions (skip={}, limit={})",
        transactions.len(),
        page.skip,
        page.limit
    );

    Ok(Json(transactions))
}
