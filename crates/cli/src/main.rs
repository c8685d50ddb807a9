//! Web Larek CLI - browse the catalog and place orders from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! larek catalog
//!
//! # Show one product
//! larek product 854cef69-976d-4c2a-a18c-2aa45046c390
//!
//! # Place an order
//! larek checkout -i 854cef69-976d-4c2a-a18c-2aa45046c390 \
//!     --payment card --address "Main St 1" \
//!     --email a@b.com --phone +79998887766
//! ```
//!
//! # Commands
//!
//! - `catalog` - Load and list the catalog
//! - `product` - Fetch a single product
//! - `checkout` - Fill the basket, run both checkout steps and submit

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_larek_core::Payment;
use web_larek_storefront::{AppError, LarekConfig};

mod commands;
mod view;

#[derive(Parser)]
#[command(name = "larek")]
#[command(author, version, about = "Web Larek storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and list the catalog
    Catalog,
    /// Fetch a single product
    Product {
        /// Product ID
        id: String,
    },
    /// Place an order
    Checkout(CheckoutArgs),
}

#[derive(clap::Args)]
struct CheckoutArgs {
    /// Product ID to put in the basket (repeatable)
    #[arg(short = 'i', long = "item", required = true)]
    items: Vec<String>,

    /// Payment method (`card` or `cash`)
    #[arg(short, long)]
    payment: Payment,

    /// Delivery address
    #[arg(short, long)]
    address: String,

    /// Contact email
    #[arg(short, long)]
    email: String,

    /// Contact phone (`+7` or `8` followed by 10 digits)
    #[arg(long)]
    phone: String,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &LarekConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Errors and warnings become Sentry events; info and debug become
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = LarekConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "web_larek_storefront=info,web_larek_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(AppError::from(e)),
    };

    if let Err(e) = result {
        e.report();
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli, config: &LarekConfig) -> web_larek_storefront::error::Result<()> {
    let session = commands::Session::new(config);

    match cli.command {
        Commands::Catalog => commands::catalog::list(&session).await,
        Commands::Product { id } => commands::product::show(&session, &id).await,
        Commands::Checkout(args) => {
            let order = commands::checkout::OrderInput {
                items: args.items,
                payment: args.payment,
                address: args.address,
                email: args.email,
                phone: args.phone,
            };
            commands::checkout::place(&session, order).await
        }
    }
}
