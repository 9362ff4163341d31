//! Provides database connections scoped to a single request and sets up the
//! application's schema.
//!
//! Every request handler opens its own [DbConnection] with
//! [ConnectionProvider::acquire]. The connection is closed when the guard is
//! dropped, which happens on every exit path of the handler, including early
//! returns via `?` and panics.

use std::{
    ops::Deref,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use rusqlite::{Connection, OpenFlags, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table};

static IN_MEMORY_DATABASE_COUNT: AtomicU64 = AtomicU64::new(0);

/// How long a connection waits for another connection's lock before giving
/// up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the application database lives.
#[derive(Debug, Clone)]
enum DatabaseLocation {
    /// A SQLite database file.
    File(PathBuf),
    /// A named in-memory database that is shared between connections.
    ///
    /// The database uses SQLite's `memdb` VFS, which locks like a database
    /// file, so concurrent connections wait on the busy timeout instead of
    /// failing with `SQLITE_LOCKED`. SQLite frees the database once its last
    /// connection closes, the `anchor` connection keeps it alive.
    Memory {
        uri: String,
        _anchor: Arc<Mutex<Connection>>,
    },
}

/// Opens a new database connection for each request.
///
/// Cloning the provider is cheap and clones refer to the same database.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    location: DatabaseLocation,
    open_connections: Arc<AtomicUsize>,
}

impl ConnectionProvider {
    /// Create a provider for the SQLite database file at `path`.
    ///
    /// The file is created on the first call to [ConnectionProvider::acquire]
    /// if it does not exist yet.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            open_connections: Arc::default(),
        }
    }

    /// Create a provider for a new, empty in-memory database.
    ///
    /// Each call creates a distinct database, so providers created by
    /// separate calls never see each other's data.
    ///
    /// # Errors
    /// Returns an error if the in-memory database cannot be opened.
    pub fn in_memory() -> Result<Self, Error> {
        let database_number = IN_MEMORY_DATABASE_COUNT.fetch_add(1, Ordering::Relaxed);
        // The leading slash makes the memdb database visible to every
        // connection in the process that opens the same name.
        let uri = format!("file:/finance_api_{database_number}?vfs=memdb");
        let anchor = open_uri(&uri)?;

        Ok(Self {
            location: DatabaseLocation::Memory {
                uri,
                _anchor: Arc::new(Mutex::new(anchor)),
            },
            open_connections: Arc::default(),
        })
    }

    /// Open a connection to the database for the duration of one request.
    ///
    /// # Errors
    /// Returns [Error::DatabaseConnection] if the connection cannot be opened.
    pub fn acquire(&self) -> Result<DbConnection, Error> {
        let connection = match &self.location {
            DatabaseLocation::File(path) => Connection::open(path).map_err(|error| {
                Error::DatabaseConnection(format!("{}: {error}", path.display()))
            })?,
            DatabaseLocation::Memory { uri, .. } => open_uri(uri)?,
        };

        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|error| Error::DatabaseConnection(error.to_string()))?;

        let open_connections = self.open_connections.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("acquired database connection ({open_connections} open)");

        Ok(DbConnection {
            connection,
            open_connections: Arc::clone(&self.open_connections),
        })
    }

    /// The number of [DbConnection]s from this provider, or its clones, that
    /// have not been dropped yet.
    pub fn open_connection_count(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }
}

fn open_uri(uri: &str) -> Result<Connection, Error> {
    Connection::open_with_flags(uri, OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI)
        .map_err(|error| Error::DatabaseConnection(format!("{uri}: {error}")))
}

/// A database connection owned by a single request.
///
/// The connection is closed when the guard goes out of scope.
#[derive(Debug)]
pub struct DbConnection {
    connection: Connection,
    open_connections: Arc<AtomicUsize>,
}

impl Deref for DbConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl Drop for DbConnection {
    fn drop(&mut self) {
        let open_connections = self.open_connections.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!("released database connection ({open_connections} open)");
    }
}

/// Create all of the database tables for the application.
///
/// Tables that already exist are left untouched, there is no migration of
/// existing tables.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
