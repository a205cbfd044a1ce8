//! Rahat CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog in afghani
//! rahat --currency AFN catalog products --featured
//!
//! # Sign in (the token is kept in RAHAT_STATE_FILE)
//! rahat auth login -e alex@example.com
//!
//! # Buy two products from the wallet with a coupon
//! rahat checkout pubg-uc-60 steam-card-10 --coupon RAHAT10 --player-id 5123456789
//!
//! # Top up a phone
//! rahat topup 0791234567 20 --method stripe
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products, categories, pages, and blog posts
//! - `auth` - Sign in, register, sign out, show the current user
//! - `wallet` - Balance, ledger, and credits
//! - `coupon check` - Validate a coupon code
//! - `orders` - Order history
//! - `checkout` - Order a list of products
//! - `topup` - Mobile airtime top-up

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rahat_core::{Currency, Language, PaymentMethod};
use rahat_storefront::config::StorefrontConfig;
use rahat_storefront::{Storefront, StorefrontError};

mod commands;

#[derive(Parser)]
#[command(name = "rahat")]
#[command(author, version, about = "Rahat Pay storefront client")]
struct Cli {
    /// Display currency (`USD`, `AFN`)
    #[arg(long, global = true, default_value = "USD")]
    currency: Currency,

    /// Interface language (`en`, `fa`)
    #[arg(long, global = true, default_value = "en")]
    language: Language,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog and CMS content
    Catalog {
        #[command(subcommand)]
        what: CatalogCommand,
    },
    /// Manage the session
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },
    /// Inspect and fund the wallet
    Wallet {
        #[command(subcommand)]
        action: WalletCommand,
    },
    /// Work with coupons
    Coupon {
        #[command(subcommand)]
        action: CouponCommand,
    },
    /// List past orders
    Orders,
    /// Order the given products, one line per slug
    Checkout {
        /// Product slugs; repeat a slug to order it twice
        #[arg(required = true)]
        slugs: Vec<String>,

        /// Coupon code to apply
        #[arg(long)]
        coupon: Option<String>,

        /// Payment method (`wallet`, `stripe`)
        #[arg(short, long, default_value = "wallet")]
        method: PaymentMethod,

        /// Game account id for digital products
        #[arg(long)]
        player_id: Option<String>,

        /// Phone number for digital products
        #[arg(long)]
        phone: Option<String>,

        /// Shipping address for physical products
        #[arg(long)]
        address: Option<String>,
    },
    /// Top up a mobile phone
    Topup {
        /// Phone number, e.g. 0791234567
        phone: String,

        /// Amount in USD
        amount: Decimal,

        /// Payment method (`wallet`, `stripe`)
        #[arg(short, long, default_value = "wallet")]
        method: PaymentMethod,

        /// Coupon code to apply
        #[arg(long)]
        coupon: Option<String>,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List products
    Products {
        /// Only featured products
        #[arg(long)]
        featured: bool,

        /// Only products of this category slug
        #[arg(long, conflicts_with = "featured")]
        category: Option<String>,
    },
    /// Show one product
    Product { slug: String },
    /// List product categories
    Categories,
    /// List CMS pages
    Pages {
        /// Only featured pages
        #[arg(long)]
        featured: bool,
    },
    /// Show one CMS page
    Page { slug: String },
    /// List blog posts
    Blog,
    /// Show one blog post
    Post { id_or_slug: String },
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "RAHAT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "RAHAT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password; defaults to `--password`
        #[arg(long)]
        password_confirmation: Option<String>,
    },
    /// Sign out and forget the token
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Show the balance
    Balance,
    /// List ledger entries
    Transactions,
    /// Add funds
    Credit {
        /// Amount in USD
        amount: Decimal,

        /// Payment method tag recorded on the transaction
        #[arg(short, long, default_value = "stripe")]
        method: PaymentMethod,
    },
}

#[derive(Subcommand)]
enum CouponCommand {
    /// Validate a coupon and show the discount it gives
    Check {
        code: String,

        /// Subtotal in USD to price the coupon against
        #[arg(long)]
        subtotal: Option<Decimal>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rahat_storefront=info,rahat_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        e.report();
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), StorefrontError> {
    let storefront = Storefront::new(config)?;
    storefront.set_currency(cli.currency);
    storefront.set_language(cli.language);

    if let Err(e) = storefront.bootstrap().await {
        tracing::warn!("Could not restore the saved session: {e}");
    }
    if let Some(message) = storefront.critical_error() {
        tracing::error!(%message, "The backend reported a configuration error");
    }

    match cli.command {
        Commands::Catalog { what } => match what {
            CatalogCommand::Products { featured, category } => {
                commands::catalog::products(&storefront, featured, category.as_deref()).await?;
            }
            CatalogCommand::Product { slug } => commands::catalog::product(&storefront, &slug).await?,
            CatalogCommand::Categories => commands::catalog::categories(&storefront).await?,
            CatalogCommand::Pages { featured } => commands::catalog::pages(&storefront, featured).await?,
            CatalogCommand::Page { slug } => commands::catalog::page(&storefront, &slug).await?,
            CatalogCommand::Blog => commands::catalog::blog(&storefront).await?,
            CatalogCommand::Post { id_or_slug } => {
                commands::catalog::post(&storefront, &id_or_slug).await?;
            }
        },
        Commands::Auth { action } => match action {
            AuthCommand::Login { email, password } => {
                commands::auth::login(&storefront, &email, password).await?;
            }
            AuthCommand::Register {
                name,
                email,
                password,
                password_confirmation,
            } => {
                let confirmation = password_confirmation.unwrap_or_else(|| password.clone());
                commands::auth::register(&storefront, name, &email, password, confirmation).await?;
            }
            AuthCommand::Logout => commands::auth::logout(&storefront).await,
            AuthCommand::Whoami => commands::auth::whoami(&storefront).await?,
        },
        Commands::Wallet { action } => match action {
            WalletCommand::Balance => commands::wallet::balance(&storefront).await?,
            WalletCommand::Transactions => commands::wallet::transactions(&storefront).await?,
            WalletCommand::Credit { amount, method } => {
                commands::wallet::credit(&storefront, amount, method).await?;
            }
        },
        Commands::Coupon {
            action: CouponCommand::Check { code, subtotal },
        } => commands::shop::check_coupon(&storefront, &code, subtotal).await?,
        Commands::Orders => commands::shop::orders(&storefront).await?,
        Commands::Checkout {
            slugs,
            coupon,
            method,
            player_id,
            phone,
            address,
        } => {
            let order = commands::shop::CheckoutArgs {
                slugs,
                coupon,
                method,
                player_id,
                phone,
                address,
            };
            commands::shop::checkout(&storefront, order).await?;
        }
        Commands::Topup {
            phone,
            amount,
            method,
            coupon,
        } => commands::topup::top_up(&storefront, &phone, amount, method, coupon.as_deref()).await?,
    }
    Ok(())
}
