//! Cart Relay - terminal storefront
//!
//! Each invocation is one user action. Cart, profile and completion marker
//! live in the data directory between runs, like browser local storage.

use anyhow::Result;
use cart_relay::config::load_app_config;
use cart_relay::{
    AppConfig, CheckoutError, CommandOpener, CustomerForm, DeepLinkDispatcher, FileStorage, HostOpener,
    Money, PrintOpener, ProfileField, Quantity, SendOutcome, SharedStorage, Storefront, SystemClock,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cart-relay", version, about = "Browse the catalog, fill a cart and send the order by chat")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List products, optionally filtered by name and category
    Products {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// List product categories
    Categories,
    /// Add a product to the cart
    Add {
        id: String,
        /// Quantity as typed; anything below 1 counts as 1
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        qty: String,
    },
    /// Increase a cart line by one
    Inc { id: String },
    /// Decrease a cart line by one (never below 1)
    Dec { id: String },
    /// Remove a cart line
    Remove { id: String },
    /// Empty the cart
    Clear,
    /// Show the cart
    Cart,
    /// Show or update saved contact details
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Validate contact details and send the order
    Checkout {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Send a test message to the store contact
    TestMessage,
    /// Show the post-order notice if an order was sent recently
    Status {
        /// Dismiss the notice
        #[arg(long)]
        ack: bool,
    },
}

type App = Storefront<DeepLinkDispatcher<HostOpener>, SystemClock>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_app_config()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut app = match build_app(&config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("Could not load products. Please try again by reloading.");
            return Err(e);
        }
    };
    run(&mut app, cli.command).await
}

async fn build_app(config: &AppConfig) -> Result<App> {
    let storage: SharedStorage = Arc::new(FileStorage::new(&config.data_dir));
    let opener = match config.open_command.as_deref().and_then(CommandOpener::parse) {
        Some(command) => HostOpener::Command(command),
        None => HostOpener::Print(PrintOpener),
    };
    let dispatcher = DeepLinkDispatcher::new(&config.deep_link_prefix, opener);
    Ok(Storefront::init(config, storage, dispatcher, SystemClock).await?)
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Products { search, category } => {
            app.set_search(&search);
            app.set_category(&category);
            let products = app.visible_products();
            if products.is_empty() {
                println!("No products found. Try other search words or another category.");
            }
            let currency = app.cart().currency().to_string();
            for p in products {
                println!("{:<10} {:<40} {:>16}  [{}]", p.id(), p.name(), Money::new(p.price(), &currency).display(), p.category());
            }
        }
        Command::Categories => {
            for category in app.catalog().categories() { println!("{category}"); }
        }
        Command::Add { id, qty } => {
            if !app.cart_mut().add(&id, Quantity::parse_lenient(&qty)) {
                println!("Unknown product {id}");
            }
            print_cart(app);
        }
        Command::Inc { id } => { app.cart_mut().increment(&id); print_cart(app); }
        Command::Dec { id } => { app.cart_mut().decrement(&id); print_cart(app); }
        Command::Remove { id } => { app.cart_mut().remove(&id); print_cart(app); }
        Command::Clear => { app.cart_mut().clear(); print_cart(app); }
        Command::Cart => print_cart(app),
        Command::Profile { name, phone, email, location } => {
            let edits = [(ProfileField::Name, name), (ProfileField::Phone, phone), (ProfileField::Email, email), (ProfileField::Location, location)];
            for (field, value) in edits {
                if let Some(value) = value { app.remember(field, &value); }
            }
            let profile = app.profile();
            println!("Name:     {}", profile.name.unwrap_or_default());
            println!("Phone:    {}", profile.phone.unwrap_or_default());
            println!("Email:    {}", profile.email.unwrap_or_default());
            println!("Location: {}", profile.location.unwrap_or_default());
        }
        Command::Checkout { name, phone, email, location, accept_terms } => {
            let saved = app.checkout_form();
            let form = CustomerForm {
                name: name.unwrap_or(saved.name),
                phone: phone.unwrap_or(saved.phone),
                email: email.unwrap_or(saved.email),
                location: location.unwrap_or(saved.location),
                terms_accepted: accept_terms,
            };
            match app.send_order(&form).await {
                Ok(SendOutcome::EmptyCart) => println!("Your cart is empty."),
                Ok(SendOutcome::Sent(receipt)) => {
                    println!("Order sent: {} items, total {}.", receipt.item_count, receipt.total.display());
                }
                Err(CheckoutError::Invalid(errors)) => {
                    for e in &errors { eprintln!("- {e}"); }
                    anyhow::bail!("order form has {} problem(s)", errors.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::TestMessage => app.send_test_message().await?,
        Command::Status { ack } => {
            match app.completion_markers().pending_acknowledgment(Utc::now()) {
                Some(at) => {
                    println!("Your order was sent successfully at {}. Thank you, we will contact you soon.", at.format("%Y-%m-%d %H:%M UTC"));
                    if ack { app.completion_markers().acknowledge(); }
                }
                None => println!("No recent order."),
            }
        }
    }
    for event in app.take_events() { tracing::debug!(?event, "domain event"); }
    Ok(())
}

fn print_cart(app: &App) {
    let cart = app.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    let currency = cart.currency();
    for entry in cart.entries() {
        let unit = Money::new(entry.product.price(), currency);
        let line = Money::new(entry.line_total(), currency);
        println!("{:<10} {:<40} {} × {} = {}", entry.product_id(), entry.product.name(), unit.display(), entry.quantity, line.display());
    }
    let totals = cart.totals();
    println!("Items: {}  Subtotal: {}", totals.item_count, totals.subtotal.display());
}
