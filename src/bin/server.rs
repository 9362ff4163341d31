use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_api::{
    AppState, ConnectionProvider, DEFAULT_ALLOWED_ORIGIN, DEFAULT_LIMIT, PaginationConfig,
    build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for recording income and expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    ///
    /// The database and its tables are created if they do not exist.
    #[arg(long, default_value = "finance.db")]
    db_path: PathBuf,

    /// Keep the database in memory instead of a file. All data is lost when
    /// the server stops.
    #[arg(long, conflicts_with = "db_path")]
    in_memory: bool,

    /// The address to serve the API from.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// The origin of the frontend that is allowed to make cross-origin requests.
    #[arg(long, default_value = DEFAULT_ALLOWED_ORIGIN)]
    allowed_origin: String,

    /// The number of transactions to list when a request does not set `limit`.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    default_page_size: u64,

    /// File path for the debug log.
    #[arg(long, default_value = "debug.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_file);

    let allowed_origin = match HeaderValue::from_str(&args.allowed_origin) {
        Ok(origin) => origin,
        Err(error) => {
            tracing::error!("Invalid allowed origin {:?}: {error}", args.allowed_origin);
            exit(1);
        }
    };

    let connection_provider = if args.in_memory {
        match ConnectionProvider::in_memory() {
            Ok(provider) => provider,
            Err(error) => {
                tracing::error!("Could not open in-memory database: {error}");
                exit(1);
            }
        }
    } else {
        ConnectionProvider::file(&args.db_path)
    };

    let pagination_config = PaginationConfig {
        default_limit: args.default_page_size,
    };

    let state = match AppState::new(connection_provider, pagination_config) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state, allowed_origin).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_file_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
    {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Could not create log file {log_file_path:?}: {error}");
            exit(1);
        }
    };

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    // RUST_LOG narrows what is logged, e.g. `RUST_LOG=finance_api=debug`.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but the error type
        // already logs server errors.
        .on_failure(());

    router.layer(tracing_layer)
}
