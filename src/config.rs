//! Command line configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::payment::CARD_FORM;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "FESTOON_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Festoon event services checkout
#[derive(Debug, Parser)]
#[command(name = "festoon", about = "Festoon event services checkout", long_about = None)]
pub struct Cli {
    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk a cart fixture through checkout and print the booking receipt
    Checkout(CheckoutArgs),
}

/// Arguments for `festoon checkout`.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Cart fixture name, loaded from `<fixtures>/carts/<cart>.yml`
    #[arg(default_value = "wedding")]
    pub cart: String,

    /// Fixture base directory
    #[arg(long, env = "FESTOON_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Simulated payment processing delay in milliseconds
    #[arg(long, env = "FESTOON_PAYMENT_DELAY_MS", default_value_t = 2000)]
    pub payment_delay_ms: u64,

    /// Discount code to apply
    #[arg(long, requires = "discount_amount")]
    pub discount_code: Option<String>,

    /// Flat discount amount in the cart currency (e.g. 50.00)
    #[arg(long, requires = "discount_code")]
    pub discount_amount: Option<String>,

    /// Saved address to deliver to
    #[arg(long, default_value = "home")]
    pub address: String,

    /// Payment method id (card-form, upi, cod, or a saved card id)
    #[arg(long, default_value = CARD_FORM)]
    pub payment_method: String,

    /// Last four digits entered on the card form
    #[arg(long)]
    pub card_last_four: Option<String>,

    /// Cardholder name entered on the card form
    #[arg(long)]
    pub cardholder_name: Option<String>,

    /// Do not accept the booking policies
    #[arg(long)]
    pub decline_policies: bool,
}

impl CheckoutArgs {
    /// Simulated payment processing delay.
    #[must_use]
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
