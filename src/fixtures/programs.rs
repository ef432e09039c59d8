//! Program Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, IDR, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, plan::share_fraction, programs::Program};

/// Plan file in YAML
#[derive(Debug, Deserialize)]
pub struct PlanFile {
    /// Total budget (e.g., "10000 IDR")
    pub budget: String,

    /// Minimum prime time share of total GRP
    #[serde(default)]
    pub prime_time_min_share: ShareFixture,

    /// Minimum PIB share of total GRP
    #[serde(default)]
    pub pib_min_share: ShareFixture,

    /// Programs, in catalog order
    pub programs: Vec<ProgramFixture>,
}

/// Share written either as a number (`0.5`) or a string (`"50%"`, `"0.5"`)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShareFixture {
    /// Fraction, e.g. `0.5`
    Fraction(f64),

    /// Percentage or fraction string
    Text(String),
}

impl Default for ShareFixture {
    fn default() -> Self {
        ShareFixture::Fraction(0.0)
    }
}

impl ShareFixture {
    /// Parse and range-check the share.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidPercentage`] if the string cannot be parsed and
    /// [`FixtureError::InvalidShare`] if the share is outside `[0, 1]`.
    pub fn to_percentage(&self) -> Result<Percentage, FixtureError> {
        let (share, raw) = match self {
            ShareFixture::Fraction(value) => {
                let fraction = Decimal::from_f64(*value)
                    .ok_or_else(|| FixtureError::InvalidPercentage(value.to_string()))?;

                (Percentage::from(fraction), value.to_string())
            }
            ShareFixture::Text(text) => (parse_percentage(text)?, text.clone()),
        };

        share_fraction(share).ok_or(FixtureError::InvalidShare(raw))?;

        Ok(share)
    }
}

/// Program Fixture
#[derive(Debug, Deserialize)]
pub struct ProgramFixture {
    /// Program name
    pub name: String,

    /// Net cost per spot (e.g., "1000 IDR")
    pub cost: String,

    /// Rating points per spot
    pub rating: f64,

    /// Whether the program airs in prime time
    #[serde(default)]
    pub prime_time: bool,

    /// Whether the program counts as PIB inventory
    #[serde(default)]
    pub pib: bool,

    /// Optional cap on the number of spots
    #[serde(default)]
    pub max_spots: Option<u32>,
}

impl TryFrom<ProgramFixture> for Program<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProgramFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.cost)?;

        let mut program = Program::new(
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.rating,
        );

        program.prime_time = fixture.prime_time;
        program.pib = fixture.pib;
        program.max_spots = fixture.max_spots;

        Ok(program)
    }
}

/// Parse price string (e.g., "10000 IDR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "IDR" => IDR,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string is not a plain decimal number, optionally followed by `%`.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();
    let invalid = || FixtureError::InvalidPercentage(s.to_string());

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let fraction = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?;

        Ok(Percentage::from(fraction))
    } else {
        let fraction = trimmed.parse::<Decimal>().map_err(|_err| invalid())?;

        Ok(Percentage::from(fraction))
    }
}
