//! Programs

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A program's cost currency differs from the catalog currency (name, program currency, catalog currency).
    #[error("Program {0} costs {1}, but catalog is in {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// A program has a negative cost per spot.
    #[error("Program {0} has a negative cost per spot")]
    NegativeCost(String),

    /// A program has a negative or non-finite rating per spot.
    #[error("Program {0} has an invalid rating per spot: {1}")]
    InvalidRating(String, f64),

    /// A program was not found in the catalog.
    #[error("Program {0} not found")]
    ProgramNotFound(usize),
}

/// A TV program that spots can be bought on.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<'a> {
    /// Program name
    pub name: String,

    /// Net cost of a single spot
    pub cost_per_spot: Money<'a, Currency>,

    /// Rating points delivered by a single spot
    pub rating_per_spot: f64,

    /// Whether the program airs in prime time
    pub prime_time: bool,

    /// Whether the program counts as PIB inventory
    pub pib: bool,

    /// Optional cap on the number of spots bought on this program
    pub max_spots: Option<u32>,
}

impl<'a> Program<'a> {
    /// Create a new uncapped program with both inventory flags unset.
    pub fn new(name: impl Into<String>, cost_per_spot: Money<'a, Currency>, rating: f64) -> Self {
        Self {
            name: name.into(),
            cost_per_spot,
            rating_per_spot: rating,
            prime_time: false,
            pib: false,
            max_spots: None,
        }
    }

    /// Mark the program as prime time inventory.
    #[must_use]
    pub fn prime_time(mut self) -> Self {
        self.prime_time = true;
        self
    }

    /// Mark the program as PIB inventory.
    #[must_use]
    pub fn pib(mut self) -> Self {
        self.pib = true;
        self
    }

    /// Cap the number of spots that can be bought on the program.
    #[must_use]
    pub fn with_max_spots(mut self, max_spots: u32) -> Self {
        self.max_spots = Some(max_spots);
        self
    }

    /// Check the numeric fields of the program.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NegativeCost`] or [`CatalogError::InvalidRating`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.cost_per_spot.to_minor_units() < 0 {
            return Err(CatalogError::NegativeCost(self.name.clone()));
        }

        if !self.rating_per_spot.is_finite() || self.rating_per_spot < 0.0 {
            return Err(CatalogError::InvalidRating(
                self.name.clone(),
                self.rating_per_spot,
            ));
        }

        Ok(())
    }
}

/// Ordered collection of programs priced in a single currency.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    programs: Vec<Program<'a>>,
    currency: &'a Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    pub fn new(currency: &'a Currency) -> Self {
        Catalog {
            programs: Vec::new(),
            currency,
        }
    }

    /// Create a catalog from a list of programs.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if any program is invalid or priced in another currency.
    pub fn with_programs(
        programs: impl IntoIterator<Item = Program<'a>>,
        currency: &'a Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new(currency);

        for program in programs {
            catalog.push(program)?;
        }

        Ok(catalog)
    }

    /// Append a program to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the program is invalid or priced in another currency.
    pub fn push(&mut self, program: Program<'a>) -> Result<(), CatalogError> {
        let program_currency = program.cost_per_spot.currency();

        if program_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                program.name,
                program_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        program.validate()?;

        self.programs.push(program);

        Ok(())
    }

    /// Iterate over the programs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Program<'a>> {
        self.programs.iter()
    }

    /// Get a program by its catalog index.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::ProgramNotFound` if the index is out of range.
    pub fn get_program(&self, program_idx: usize) -> Result<&Program<'a>, CatalogError> {
        self.programs
            .get(program_idx)
            .ok_or(CatalogError::ProgramNotFound(program_idx))
    }

    /// Get the currency of the catalog.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Get the number of programs in the catalog.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
