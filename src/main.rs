//! Festoon CLI

use std::{io, sync::Arc};

use anyhow::{Context, bail, ensure};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use festoon::{
    checkout::{Checkout, PaymentResolution},
    config::{CheckoutArgs, Cli, Command},
    fixtures::{Fixture, parse_amount},
    ids::{AddressId, PaymentMethodId},
    observability,
    payment::{CARD_FORM, PaymentDetails, SimulatedGateway},
    receipt::BookingReceipt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::load().unwrap_or_else(|err| err.exit());

    observability::init(&cli.logging)?;

    match cli.command {
        Command::Checkout(args) => checkout(args).await,
    }
}

async fn checkout(args: CheckoutArgs) -> anyhow::Result<()> {
    let fixture = Fixture::with_base_path(&args.fixtures)
        .load_cart(&args.cart)
        .with_context(|| format!("failed to load cart fixture '{}'", args.cart))?;

    let currency = fixture.currency();
    let cart = Arc::new(fixture.into_cart()?);
    let gateway = Arc::new(SimulatedGateway::new(args.payment_delay()));

    let shutdown = CancellationToken::new();
    listen_for_ctrl_c(shutdown.clone());

    let mut checkout = Checkout::new(cart, gateway)?.with_cancellation(shutdown.child_token());

    if let (Some(code), Some(amount)) = (&args.discount_code, &args.discount_amount) {
        checkout.apply_discount(code.as_str(), parse_amount(amount, currency)?)?;
    }

    ensure!(
        checkout.next_step().is_moved(),
        "cart '{}' has no services",
        args.cart
    );

    checkout.select_address(AddressId::new(args.address.as_str()));

    ensure!(checkout.next_step().is_moved(), "no address selected");
    ensure!(checkout.next_step().is_moved(), "order review failed");

    checkout.select_payment_method(PaymentMethodId::new(args.payment_method.as_str()));
    checkout.set_policy_agreement(!args.decline_policies);

    let details = card_details(&args);

    ensure!(
        args.payment_method != CARD_FORM || details.is_some(),
        "--card-last-four is required for the card form"
    );
    ensure!(
        !args.decline_policies,
        "booking policies must be accepted before paying"
    );

    let resolution = checkout.process_payment(details).await?;

    match resolution {
        PaymentResolution::Confirmed { reference, booking } => {
            info!(%reference, order_number = %booking.order_number, "checkout complete");

            let data = checkout.state().checkout_data();
            let mut receipt = BookingReceipt::new(&booking);

            if data.has_discount() {
                receipt = receipt.with_discount(data.discount_code(), data.discount_amount());
            }

            receipt.write_to(io::stdout().lock())?;

            Ok(())
        }
        PaymentResolution::Declined { reason } => bail!("payment declined: {reason}"),
    }
}

fn card_details(args: &CheckoutArgs) -> Option<PaymentDetails> {
    if args.payment_method != CARD_FORM {
        return None;
    }

    let details = PaymentDetails::new(args.card_last_four.clone()?);

    Some(match &args.cardholder_name {
        Some(name) => details.with_cardholder_name(name.as_str()),
        None => details,
    })
}

fn listen_for_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl_c signal received");
                shutdown.cancel();
            }
            Err(source) => warn!("failed to install Ctrl+C handler: {source}"),
        }
    });
}
