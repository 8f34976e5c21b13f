use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Instrument};

use cart_engine::{setup_tracing, Cart, CartConfig, CartSystem, ProductId};

/// Manage the persisted shopping cart against the catalog service.
#[derive(Debug, Parser)]
#[command(name = "cart", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current cart
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product line
    Remove { product_id: ProductId },
    /// Set the quantity of a product already in the cart
    Set {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }
    setup_tracing();

    let cli = Cli::parse();
    let config = CartConfig::from_env();
    info!(catalog_url = %config.catalog_url, data_dir = %config.data_dir, "Starting cart");

    let system = CartSystem::from_config(&config).map_err(|e| e.to_string())?;
    let client = system.cart_client.clone();

    let span = tracing::info_span!("cart_command", command = ?cli.command);
    let outcome = async {
        match cli.command {
            Command::Show => Ok(()),
            Command::Add { product_id } => client.add_product(product_id).await,
            Command::Remove { product_id } => client.remove_product(product_id).await,
            Command::Set { product_id, amount } => {
                client.update_product_amount(product_id, amount).await
            }
        }
    }
    .instrument(span)
    .await;

    match &outcome {
        Ok(()) => print_cart(&client.cart()),
        Err(e) => error!(error = %e, "Cart command failed"),
    }

    drop(client);
    if let Err(e) = system.shutdown().await {
        warn!(error = %e, "Cart shutdown failed");
    }

    outcome.map_err(|e| e.to_string())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for item in cart.items() {
        println!("{:>6}  {:<40} {:>10.2} x {}", item.id, item.title, item.price, item.amount);
    }
    println!("{} line(s), {} unit(s)", cart.len(), cart.total_units());
}
