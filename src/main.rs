use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use storefront_checkout::application::flow::CheckoutFlow;
use storefront_checkout::config::CheckoutConfig;
use storefront_checkout::domain::ports::LocalStorageBox;
use storefront_checkout::infrastructure::http::{ApiClient, HttpCartService, HttpPaymentGateway};
use storefront_checkout::infrastructure::in_memory::InMemoryStorage;
use storefront_checkout::infrastructure::terminal::TerminalNavigator;
use storefront_checkout::interfaces::console::ConsoleRenderer;
use storefront_checkout::interfaces::csv::cart_reader::CartReader;
use storefront_checkout::interfaces::query::parse_return_url;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const AUTH_TOKEN_KEY: &str = "auth_token";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file. Without it, CHECKOUT_* environment variables are used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent local storage (optional). If provided, uses RocksDB.
    #[arg(long)]
    storage_path: Option<PathBuf>,

    /// Print technical error details (non-production use).
    #[arg(long)]
    show_details: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start checkout for the cart in a CSV file
    Checkout {
        /// Cart CSV with a `product_id,quantity,unit_price` header
        cart: PathBuf,
    },
    /// Verify a payment after the provider redirected back
    Verify {
        /// Return URL, absolute or relative to the site origin
        return_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CheckoutConfig::load(cli.config.as_deref())?;
    config.show_error_details |= cli.show_details;

    let storage = open_storage(cli.storage_path)?;
    let auth_token = storage.get(AUTH_TOKEN_KEY).await?;

    let api = ApiClient::new(&config)?.with_auth_token(auth_token);
    let origin = config.origin()?;

    let location = match &cli.command {
        Command::Checkout { .. } => origin.join("checkout").into_diagnostic()?,
        Command::Verify { return_url } => parse_return_url(return_url, &origin)?,
    };

    let mut flow = CheckoutFlow::new(
        &config,
        Box::new(HttpPaymentGateway::new(api.clone())),
        Box::new(HttpCartService::new(api)),
        storage,
        Box::new(TerminalNavigator::new(location.as_str())),
    )?;

    let state = match cli.command {
        Command::Checkout { cart } => {
            let file = File::open(cart).into_diagnostic()?;
            let cart = CartReader::new(file).read_cart(|e| {
                eprintln!("Error reading cart line: {}", e);
            });
            info!(items = cart.item_count(), "Cart loaded");
            flow.begin_checkout(&cart).await
        }
        Command::Verify { .. } => flow.complete_checkout(&location).await,
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut renderer = ConsoleRenderer::new(stdout.lock(), stderr.lock());
    if !renderer.render(state).into_diagnostic()? {
        return Err(miette::miette!("checkout did not complete"));
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_storage(path: Option<PathBuf>) -> Result<LocalStorageBox> {
    use storefront_checkout::infrastructure::rocksdb::RocksDbStorage;

    match path {
        Some(path) => Ok(Box::new(RocksDbStorage::open(path)?)),
        None => Ok(Box::new(InMemoryStorage::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_storage(path: Option<PathBuf>) -> Result<LocalStorageBox> {
    if path.is_some() {
        tracing::warn!("persistent storage requested without the storage-rocksdb feature");
        eprintln!(
            "WARNING: Persistent storage requested via --storage-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryStorage::new()))
}
