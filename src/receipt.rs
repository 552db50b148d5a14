//! Receipt

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{booking::BookingDetail, pricing::Price};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Printable confirmation for a completed booking.
#[derive(Debug, Clone)]
pub struct BookingReceipt<'a> {
    booking: &'a BookingDetail,

    /// Applied discount code and amount, shown above the total.
    discount: Option<(&'a str, Price)>,
}

impl<'a> BookingReceipt<'a> {
    /// Receipt for `booking`.
    #[must_use]
    pub fn new(booking: &'a BookingDetail) -> Self {
        Self {
            booking,
            discount: None,
        }
    }

    /// Show the discount applied at checkout.
    #[must_use]
    pub fn with_discount(mut self, code: &'a str, amount: Price) -> Self {
        self.discount = Some((code, amount));
        self
    }

    /// The booking being rendered.
    #[must_use]
    pub fn booking(&self) -> &BookingDetail {
        self.booking
    }

    /// Writes the receipt to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Service", "Qty"]);

        for (idx, service) in self.booking.services.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                service.name.clone(),
                service.quantity.to_string(),
            ]);
        }

        write_services_table(&mut out, builder)?;
        write_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_services_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

/// One `label  value` row under the services table.
struct SummaryLine {
    label: String,
    value: String,
    bold: bool,
}

impl SummaryLine {
    fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

fn summary_lines(receipt: &BookingReceipt<'_>) -> Vec<SummaryLine> {
    let booking = receipt.booking;

    let mut lines = vec![
        SummaryLine::new("Order:", &booking.order_number),
        SummaryLine::new("Booking date:", booking.booking_date),
        SummaryLine::new("Venue:", &booking.venue),
        SummaryLine::new("Payment:", &booking.payment_method),
    ];

    if let Some(name) = &booking.cardholder_name {
        lines.push(SummaryLine::new("Cardholder:", name));
    }

    if let Some((code, amount)) = receipt.discount {
        lines.push(SummaryLine::new(format!("Discount ({code}):"), format!("-{amount}")));
    }

    lines.push(SummaryLine::new("Total:", booking.total_amount).bold());

    lines
}

fn write_summary(out: &mut impl io::Write, receipt: &BookingReceipt<'_>) -> Result<(), ReceiptError> {
    let lines = summary_lines(receipt);

    // Labels are plain text, so char count is the printed width.
    let label_width = lines
        .iter()
        .map(|line| line.label.chars().count())
        .max()
        .unwrap_or_default();

    for SummaryLine { label, value, bold } in &lines {
        let padded = format!(" {label:>label_width$}  {value}");

        if *bold {
            writeln!(out, "{BOLD}{padded}{RESET}")?;
        } else {
            writeln!(out, "{padded}")?;
        }
    }

    writeln!(out)?;

    Ok(())
}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
