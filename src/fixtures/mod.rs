//! Fixtures

use std::{fs, path::PathBuf};

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    fixtures::programs::PlanFile,
    plan::PlanRequest,
    programs::{Catalog, CatalogError, Program},
};

pub mod programs;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Share outside `[0, 1]`
    #[error("Share must be between 0 and 1, got: {0}")]
    InvalidShare(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the budget and a program
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Program failed catalog validation
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Fixture loader rooted at a base directory
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load `plans/<name>.yml` into a catalog and plan request
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price, share or
    /// currency is invalid, or a program fails catalog validation.
    pub fn load_plan(&self, name: &str) -> Result<PlanFixture, FixtureError> {
        let file_path = self.base_path.join("plans").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        PlanFixture::from_yaml(&contents)
    }
}

/// A loaded plan: the catalog and the request to plan it with
#[derive(Debug, Clone)]
pub struct PlanFixture {
    catalog: Catalog<'static>,
    request: PlanRequest<'static>,
}

impl PlanFixture {
    /// Load a named plan from the default fixture directory
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Fixture::new().load_plan(name)
    }

    /// Parse a plan from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any value fails validation.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let file: PlanFile = serde_norway::from_str(contents)?;

        let (budget_minor, currency) = programs::parse_price(&file.budget)?;

        let mut catalog = Catalog::new(currency);

        for program_fixture in file.programs {
            let program = Program::try_from(program_fixture)?;

            ensure_same_currency(currency, program.cost_per_spot.currency())?;

            catalog.push(program)?;
        }

        let request = PlanRequest::with_budget(Money::from_minor(budget_minor, currency))
            .prime_time_share(file.prime_time_min_share.to_percentage()?)
            .pib_share(file.pib_min_share.to_percentage()?);

        Ok(PlanFixture { catalog, request })
    }

    /// Catalog of programs, in file order
    pub fn catalog(&self) -> &Catalog<'static> {
        &self.catalog
    }

    /// Budget and share requirements
    pub fn request(&self) -> &PlanRequest<'static> {
        &self.request
    }

    /// Replace the request, e.g. to apply command line overrides
    #[must_use]
    pub fn with_request(mut self, request: PlanRequest<'static>) -> Self {
        self.request = request;
        self
    }
}

fn ensure_same_currency(expected: &Currency, found: &Currency) -> Result<(), FixtureError> {
    if expected != found {
        return Err(FixtureError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::IDR;
    use testresult::TestResult;

    use super::*;

    const PLAN: &str = r#"
budget: "10000 IDR"
prime_time_min_share: "50%"
pib_min_share: 0.1
programs:
  - name: A
    cost: "1000 IDR"
    rating: 1.0
    prime_time: true
  - name: B
    cost: "500 IDR"
    rating: 0.5
    pib: true
    max_spots: 4
"#;

    #[test]
    fn from_yaml_builds_catalog_and_request() -> TestResult {
        let fixture = PlanFixture::from_yaml(PLAN)?;

        assert_eq!(fixture.catalog().len(), 2);
        assert_eq!(fixture.catalog().currency(), IDR);

        let b = fixture.catalog().get_program(1)?;
        assert!(b.pib);
        assert_eq!(b.max_spots, Some(4));

        let request = fixture.request();
        assert_eq!(request.budget.currency(), IDR);
        assert_eq!(request.prime_time_min_share, Percentage::from(0.5));
        assert_eq!(request.pib_min_share, Percentage::from(0.1));

        Ok(())
    }

    #[test]
    fn shares_default_to_zero() -> TestResult {
        let fixture = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\nprograms:\n  - name: A\n    cost: \"10 IDR\"\n    rating: 1\n",
        )?;

        assert_eq!(fixture.request().prime_time_min_share, Percentage::from(0.0));
        assert_eq!(fixture.request().pib_min_share, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let result = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\nprograms:\n  - name: A\n    cost: \"10 USD\"\n    rating: 1\n",
        );

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "IDR" && found == "USD"
        ));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let result = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\nprograms:\n  - name: A\n    cost: \"-10 IDR\"\n    rating: 1\n",
        );

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::NegativeCost(name))) if name == "A"
        ));
    }

    #[test]
    fn negative_rating_is_rejected() {
        let result = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\nprograms:\n  - name: A\n    cost: \"10 IDR\"\n    rating: -1\n",
        );

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::InvalidRating(..)))
        ));
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let result = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\nprime_time_min_share: \"150%\"\nprograms: []\n",
        );

        assert!(matches!(result, Err(FixtureError::InvalidShare(share)) if share == "150%"));
    }

    #[test]
    fn non_finite_share_is_rejected_without_panicking() {
        let nan = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\nprime_time_min_share: .nan\nprograms: []\n",
        );
        let huge = PlanFixture::from_yaml("budget: \"100 IDR\"\npib_min_share: 1e30\nprograms: []\n");
        let text = PlanFixture::from_yaml(
            "budget: \"100 IDR\"\npib_min_share: \"NaN\"\nprograms: []\n",
        );

        assert!(matches!(nan, Err(FixtureError::InvalidPercentage(_))));
        assert!(matches!(huge, Err(FixtureError::InvalidPercentage(_))));
        assert!(matches!(text, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Fixture::with_base_path("./does-not-exist").load_plan("nope");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
