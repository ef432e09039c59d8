//! Plan Requests

use decimal_percentage::Percentage;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Budget and inventory share requirements for a single planning run.
#[derive(Debug, Clone, Copy)]
pub struct PlanRequest<'a> {
    /// Total spend ceiling
    pub budget: Money<'a, Currency>,

    /// Minimum fraction of total GRP that must come from prime time programs
    pub prime_time_min_share: Percentage,

    /// Minimum fraction of total GRP that must come from PIB programs
    pub pib_min_share: Percentage,
}

impl<'a> PlanRequest<'a> {
    /// Create a request with a budget and no share requirements.
    #[must_use]
    pub fn with_budget(budget: Money<'a, Currency>) -> Self {
        Self {
            budget,
            prime_time_min_share: Percentage::from(0.0),
            pib_min_share: Percentage::from(0.0),
        }
    }

    /// Require a minimum prime time share of total GRP.
    #[must_use]
    pub fn prime_time_share(mut self, share: Percentage) -> Self {
        self.prime_time_min_share = share;
        self
    }

    /// Require a minimum PIB share of total GRP.
    #[must_use]
    pub fn pib_share(mut self, share: Percentage) -> Self {
        self.pib_min_share = share;
        self
    }
}

/// Convert a share to a solver coefficient, if it lies within `[0, 1]`.
pub(crate) fn share_fraction(share: Percentage) -> Option<f64> {
    let fraction = share * Decimal::ONE;

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return None;
    }

    fraction.to_f64()
}
