//! Bazaar CLI - browse, shop, and administer a Bazaar storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bazaar products --category Kitchen --sort price-asc
//!
//! # Manage the persisted cart
//! bazaar cart add 12
//! bazaar cart set 12 3
//! bazaar cart show
//!
//! # Place an order (anonymous, or signed in with --identifier)
//! bazaar checkout --name "Amna" --address "12 Mall Road" --phone 0300-1234567
//!
//! # Look up an order without signing in
//! bazaar track TRK-9F3A
//!
//! # Admin operations
//! BAZAAR_PASSWORD=... bazaar admin --identifier admin@example.com orders
//! ```
//!
//! # Environment Variables
//!
//! See `bazaar_storefront::config` for backend and cart settings.
//! `BAZAAR_IDENTIFIER` and `BAZAAR_PASSWORD` stand in for the login flags.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_core::{CategoryId, OrderId, OrderStatus, ProductId};
use bazaar_storefront::catalog::ProductSort;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::state::AppContext;

mod commands;

use commands::{CliError, LoginArgs};

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products in this category
        #[arg(long)]
        category: Option<String>,

        /// Only products in this subcategory
        #[arg(long)]
        subcategory: Option<String>,

        /// Case-insensitive match on name or description
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort order (`name`, `price-asc`, `price-desc`)
        #[arg(long, default_value = "name")]
        sort: ProductSort,
    },
    /// List categories and their subcategories
    Categories,
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart
    Checkout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        phone: String,

        #[command(flatten)]
        login: LoginArgs,
    },
    /// Show your order history
    Orders {
        /// Page number (10 orders per page)
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[command(flatten)]
        login: LoginArgs,
    },
    /// Look up an order by tracking ID
    Track { tracking_id: String },
    /// Show who the session belongs to
    Whoami {
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Create an account
    Register {
        /// Username
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Account password (at least 6 characters)
        #[arg(long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Administrative operations
    Admin {
        #[command(flatten)]
        login: LoginArgs,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and total
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product's line
    Remove { product_id: ProductId },
    /// Set a line's quantity (0 removes it)
    Set {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every order
    Orders {
        /// Page number (10 orders per page)
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Change an order's status
    SetStatus {
        order_id: OrderId,
        /// `pending`, `accepted`, `shipped`, `delivered` or `cancelled`
        status: OrderStatus,
    },
    /// Create a category
    AddCategory { name: String },
    /// Create a subcategory
    AddSubcategory { category_id: CategoryId, name: String },
    /// Create a product
    AddProduct(commands::admin::ProductArgs),
    /// Product and order counts
    Summary,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Products {
            category,
            subcategory,
            search,
            sort,
        } => commands::catalog::products(&ctx, category, subcategory, &search, sort).await?,
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add { product_id } => commands::cart::add(&ctx, product_id).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, product_id),
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&ctx, product_id, quantity),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Checkout {
            name,
            address,
            phone,
            login,
        } => commands::checkout::place_order(&ctx, &login, name, address, phone).await?,
        Commands::Orders { page, login } => commands::orders::history(&ctx, &login, page).await?,
        Commands::Track { tracking_id } => commands::orders::track(&ctx, &tracking_id).await?,
        Commands::Whoami { login } => commands::account::whoami(&ctx, &login).await,
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&ctx, &name, &email, password.into()).await?,
        Commands::Admin { login, action } => {
            let admin = commands::sign_in(&ctx, &login).await?;
            let console = ctx.admin(Some(&admin));
            match action {
                AdminAction::Orders { page } => commands::admin::orders(&console, page).await?,
                AdminAction::SetStatus { order_id, status } => {
                    commands::admin::set_status(&console, order_id, status).await?;
                }
                AdminAction::AddCategory { name } => {
                    commands::admin::add_category(&console, &name).await?;
                }
                AdminAction::AddSubcategory { category_id, name } => {
                    commands::admin::add_subcategory(&console, category_id, &name).await?;
                }
                AdminAction::AddProduct(args) => commands::admin::add_product(&console, args).await?,
                AdminAction::Summary => commands::admin::summary(&console).await?,
            }
        }
    }
    Ok(())
}
