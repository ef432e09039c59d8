//! Utils

use clap::Parser;
use rusty_money::Money;

use crate::fixtures::{
    FixtureError, PlanFixture,
    programs::{ShareFixture, parse_price},
};

/// Arguments for the plan example
#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// Fixture set to use for the catalog & request
    #[clap(short, long, default_value = "weekly")]
    pub fixture: String,

    /// Output file path
    #[clap(short, long)]
    pub out: Option<String>,

    /// Override the budget (e.g. "5000000 IDR")
    #[clap(long)]
    pub budget: Option<String>,

    /// Override the minimum prime time share (e.g. "50%" or "0.5")
    #[clap(long)]
    pub prime_time_share: Option<String>,

    /// Override the minimum PIB share (e.g. "10%" or "0.1")
    #[clap(long)]
    pub pib_share: Option<String>,
}

impl PlanArgs {
    /// Apply any command line overrides to the fixture's request.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if an override cannot be parsed, is out of range,
    /// or the budget currency differs from the catalog currency.
    pub fn apply_overrides(&self, fixture: PlanFixture) -> Result<PlanFixture, FixtureError> {
        let mut request = *fixture.request();

        if let Some(budget) = self.budget.as_deref() {
            let (minor_units, currency) = parse_price(budget)?;
            let catalog_currency = fixture.catalog().currency();

            if currency != catalog_currency {
                return Err(FixtureError::CurrencyMismatch(
                    catalog_currency.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }

            request.budget = Money::from_minor(minor_units, currency);
        }

        if let Some(share) = self.prime_time_share.clone() {
            request.prime_time_min_share = ShareFixture::Text(share).to_percentage()?;
        }

        if let Some(share) = self.pib_share.clone() {
            request.pib_min_share = ShareFixture::Text(share).to_percentage()?;
        }

        Ok(fixture.with_request(request))
    }
}
