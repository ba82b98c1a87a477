use argh::FromArgs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solder::store::Store;
use solder::{AppState, create_app};

#[derive(FromArgs, Debug)]
/// Solder: recent modpack builds and package releases at a glance.
struct Args {
    /// host to bind to
    #[argh(option, default = "String::from(\"127.0.0.1\")")]
    host: String,

    /// port to listen on (0 for random available port)
    #[argh(option, short = 'p', default = "0")]
    port: u16,

    /// JSON seed file for the catalog (falls back to $SOLDER_DATA)
    #[argh(option)]
    data: Option<PathBuf>,

    /// username of the bootstrap account created from $SOLDER_ADMIN_PASSWORD
    #[argh(option, default = "String::from(\"admin\")")]
    admin_user: String,

    /// open the browser automatically
    #[argh(switch, short = 'o')]
    open: bool,
}

fn load_store(data: Option<PathBuf>) -> Result<Store, solder::store::StoreError> {
    let path = data.or_else(|| std::env::var_os("SOLDER_DATA").map(PathBuf::from));
    match path {
        Some(path) => Store::load(path),
        None => {
            tracing::warn!("No seed file given, starting with an empty catalog");
            Ok(Store::new())
        }
    }
}

/// Creates the bootstrap account when a password is provided through the environment.
fn bootstrap_admin(store: &Store, username: &str) -> Result<(), solder::AppError> {
    let Ok(password) = std::env::var("SOLDER_ADMIN_PASSWORD") else {
        return Ok(());
    };
    if store.user_by_username(username).is_some() {
        tracing::warn!(username, "account already exists, not overwriting its password");
        return Ok(());
    }
    store.create_user(username, solder::auth::hash_password(&password)?)?;
    tracing::info!(username, "created bootstrap account");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Args = argh::from_env();

    let store = match load_store(args.data) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = bootstrap_admin(&store, &args.admin_user) {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    let app = create_app(Arc::new(AppState::new(store)));

    let addr: SocketAddr = match format!("{}:{}", args.host, args.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid host or port: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    let url = match listener.local_addr() {
        Ok(actual_addr) => format!("http://{}", actual_addr),
        Err(_) => format!("http://{}", addr),
    };

    tracing::info!("{}", url);

    if args.open && let Err(e) = open::that(&url) {
        tracing::error!("Failed to open browser: {}", e);
    }

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
