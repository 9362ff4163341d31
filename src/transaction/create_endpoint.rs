//! Defines the endpoint for creating a new transaction.

use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    db::ConnectionProvider,
    transaction::{NewTransaction, Transaction, core::create_transaction},
};

/// A route handler for creating a new transaction.
///
/// Responds with the stored transaction, including the ID assigned by the
/// database.
pub async fn create_transaction_endpoint(
    State(connection_provider): State<ConnectionProvider>,
    WithRejection(Json(new_transaction), _): WithRejection<Json<NewTransaction>, Error>,
) -> Result<Json<Transaction>, Error> {
    let connection = connection_provider.acquire()?;

    let transaction = create_transaction(new_transaction, &connection)?;

    tracing::info!("created transaction {}", transaction.id);

    Ok(Json(transaction))
}
