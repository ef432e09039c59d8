//! Summary Metrics

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::{
    allocation::AllocationRow,
    programs::Catalog,
    solvers::SolverError,
};

/// Aggregate metrics over all rows of an allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics<'a> {
    /// Sum of row costs
    pub total_cost: Money<'a, Currency>,

    /// Sum of row GRP, rounded to two decimal places
    pub total_grp: Decimal,

    /// Unrounded GRP delivered by prime time programs
    pub prime_time_grp: f64,

    /// Unrounded GRP delivered by PIB programs
    pub pib_grp: f64,

    /// Prime time GRP as percent points of `total_grp`, rounded to two decimal places
    pub prime_time_percent: Decimal,

    /// PIB GRP as percent points of `total_grp`, rounded to two decimal places
    pub pib_percent: Decimal,
}

impl<'a> SummaryMetrics<'a> {
    /// Fold rows into summary metrics.
    ///
    /// Row GRP is summed unrounded and rounded once at the end; both percentages are
    /// taken relative to the rounded total and are zero when the total is zero.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if a row refers to a missing program, costs cannot
    /// be added, or GRP cannot be represented as a decimal.
    pub fn from_rows(
        catalog: &Catalog<'a>,
        rows: &[AllocationRow<'a>],
    ) -> Result<Self, SolverError> {
        let mut total_cost = Money::from_minor(0, catalog.currency());
        let mut raw_grp = 0.0;
        let mut prime_time_grp = 0.0;
        let mut pib_grp = 0.0;

        for row in rows {
            let program = catalog.get_program(row.program_idx)?;

            total_cost = total_cost.add(row.cost)?;
            raw_grp += row.grp;

            if program.prime_time {
                prime_time_grp += row.grp;
            }

            if program.pib {
                pib_grp += row.grp;
            }
        }

        let total_grp = decimal_from_grp(raw_grp)?.round_dp(2);

        Ok(SummaryMetrics {
            total_cost,
            total_grp,
            prime_time_grp,
            pib_grp,
            prime_time_percent: percent_of_total(prime_time_grp, total_grp)?,
            pib_percent: percent_of_total(pib_grp, total_grp)?,
        })
    }
}

fn decimal_from_grp(grp: f64) -> Result<Decimal, SolverError> {
    Decimal::from_f64(grp).ok_or(SolverError::InvariantViolation {
        message: "GRP cannot be represented as a decimal",
    })
}

/// Share of `total_grp` in percent points, rounded to two decimal places.
fn percent_of_total(class_grp: f64, total_grp: Decimal) -> Result<Decimal, SolverError> {
    if total_grp.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let percent = decimal_from_grp(class_grp)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|points| points.checked_div(total_grp))
        .ok_or(SolverError::InvariantViolation {
            message: "GRP percentage overflows",
        })?;

    Ok(percent.round_dp(2))
}
