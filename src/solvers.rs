//! Solvers for Spot Plans

use rusty_money::MoneyError;
use thiserror::Error;

use crate::{
    allocation::Allocation,
    plan::PlanRequest,
    programs::{Catalog, CatalogError},
};

pub mod ilp;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// The catalog has no programs, so there is nothing to allocate.
    #[error("catalog is empty; add programs before planning")]
    EmptyCatalog,

    /// No assignment of spots satisfies the budget and share constraints.
    #[error("no spot allocation satisfies the budget and share constraints")]
    Infeasible,

    /// The backend failed to produce a solution (unbounded model, numerical failure, etc.).
    #[error("solver failed: {reason}")]
    Backend {
        /// Backend supplied reason
        reason: String,
    },

    /// Budget currency differs from the catalog currency.
    #[error("budget is in {budget}, but catalog is in {catalog}")]
    CurrencyMismatch {
        /// Budget currency code
        budget: &'static str,
        /// Catalog currency code
        catalog: &'static str,
    },

    /// Budget is negative.
    #[error("budget must not be negative")]
    NegativeBudget,

    /// A minimum share is outside `[0, 1]`.
    #[error("{name} minimum share must be between 0 and 1")]
    InvalidShare {
        /// Which share was invalid
        name: &'static str,
    },

    /// A free program with positive rating and no spot cap makes the plan unbounded.
    #[error("program {program_idx} delivers rating at no cost and has no spot cap")]
    UnboundedProgram {
        /// Catalog index of the program
        program_idx: usize,
    },

    /// Money amount in minor units cannot be represented exactly as a solver coefficient.
    #[error(
        "money amount in minor units cannot be represented exactly as a solver coefficient: {0}"
    )]
    MinorUnitsNotRepresentable(i64),

    /// Spot cost overflowed when multiplied out.
    #[error("cost of {spots} spots on program {program_idx} overflows")]
    SpotsOverflow {
        /// Catalog index of the program
        program_idx: usize,
        /// Number of spots chosen
        spots: u64,
    },

    /// Wrapped catalog lookup error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// Trait for planning spot allocations over a catalog
pub trait Solver {
    /// Allocate the request's budget across the catalog
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the request is rejected or the solver finds no solution.
    fn plan<'a>(
        catalog: &Catalog<'a>,
        request: &PlanRequest<'a>,
    ) -> Result<Allocation<'a>, SolverError>;
}
