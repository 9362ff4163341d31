//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;

use crate::{
    Error,
    db::{ConnectionProvider, initialize},
    pagination::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Opens a database connection for each request.
    pub connection_provider: ConnectionProvider,

    /// The config that controls how many transactions are listed by default.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] for the database behind `connection_provider`.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(
        connection_provider: ConnectionProvider,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        {
            let connection = connection_provider.acquire()?;
            initialize(&connection)?;
        }

        Ok(Self {
            connection_provider,
            pagination_config,
        })
    }
}

impl FromRef<AppState> for ConnectionProvider {
    fn from_ref(state: &AppState) -> Self {
        state.connection_provider.clone()
    }
}

impl FromRef<AppState> for PaginationConfig {
    fn from_ref(state: &AppState) -> Self {
        state.pagination_config
    }
}
