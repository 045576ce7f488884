//! GoMarket cart CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart show
//!
//! # Add one unit of a product
//! gm-cart add --id p1 --title "Canvas Tote" --image-url https://cdn/tote.png --price 12.99
//!
//! # Adjust quantities
//! gm-cart increment p1
//! gm-cart decrement p1
//!
//! # Empty the cart
//! gm-cart clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print cart lines, item count and subtotal
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Adjust a line's quantity
//! - `clear` - Empty the cart and delete its record

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "GoMarket cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(short, long)]
        title: String,

        /// Display image URL
        #[arg(short, long)]
        image_url: String,

        /// Unit price (e.g. 12.99)
        #[arg(short, long)]
        price: String,
    },
    /// Add one unit to an existing line
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from an existing line (never below one)
    Decrement {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_market_cart=info,go_market_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::cart::CommandError> {
    let store = commands::cart::open_store().await?;

    match cli.command {
        Commands::Show => commands::cart::show(&store)?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&store, id, title, image_url, &price)?,
        Commands::Increment { id } => commands::cart::increment(&store, id)?,
        Commands::Decrement { id } => commands::cart::decrement(&store, id)?,
        Commands::Clear => commands::cart::clear(&store)?,
    }

    store.flush().await;
    Ok(())
}
