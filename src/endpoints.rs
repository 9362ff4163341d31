//! The API endpoints URIs.

/// The route for creating and listing transactions.
///
/// The trailing slash is part of the route, `/transactions` is not routed.
pub const TRANSACTIONS: &str = "/transactions/";
