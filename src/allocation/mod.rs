//! Allocations
//!
//! Projects the raw spot values reported by a backend back onto the catalog.

use num_traits::ToPrimitive;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    programs::Catalog,
    solvers::{SolverError, ilp::backend::SolveStatus},
};

mod summary;

pub use summary::SummaryMetrics;

/// Spot values closer than this to an integer are considered integral.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Spots bought on a single program.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRow<'a> {
    /// Index of the program in the catalog
    pub program_idx: usize,

    /// Number of spots bought
    pub spots: u64,

    /// Cost of the spots (`cost_per_spot × spots`)
    pub cost: Money<'a, Currency>,

    /// Rating points delivered by the spots (`rating_per_spot × spots`), unrounded
    pub grp: f64,
}

/// A solved spot plan: one row per program plus the summary metrics.
#[derive(Debug, Clone)]
pub struct Allocation<'a> {
    status: SolveStatus,
    rows: SmallVec<[AllocationRow<'a>; 10]>,
    metrics: SummaryMetrics<'a>,
}

impl<'a> Allocation<'a> {
    /// Build an allocation from the spot values reported for an accepted solution.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvariantViolation`] if the number of values does not match
    /// the catalog or a value is not a non-negative integer, and
    /// [`SolverError::SpotsOverflow`] if a cost cannot be represented.
    pub fn from_spot_values(
        catalog: &Catalog<'a>,
        status: SolveStatus,
        spot_values: &[f64],
    ) -> Result<Self, SolverError> {
        let rows = project_rows(catalog, spot_values)?;
        let metrics = SummaryMetrics::from_rows(catalog, &rows)?;

        Ok(Allocation {
            status,
            rows,
            metrics,
        })
    }

    /// Whether the backend proved the allocation optimal.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Per-program rows, in catalog order.
    pub fn rows(&self) -> &[AllocationRow<'a>] {
        &self.rows
    }

    /// Spot counts, in catalog order.
    pub fn spots(&self) -> SmallVec<[u64; 10]> {
        self.rows.iter().map(|row| row.spots).collect()
    }

    /// Summary metrics for the whole plan.
    pub fn metrics(&self) -> &SummaryMetrics<'a> {
        &self.metrics
    }
}

/// Turn raw spot values into rows.
fn project_rows<'a>(
    catalog: &Catalog<'a>,
    spot_values: &[f64],
) -> Result<SmallVec<[AllocationRow<'a>; 10]>, SolverError> {
    if spot_values.len() != catalog.len() {
        return Err(SolverError::InvariantViolation {
            message: "spot value count does not match number of programs",
        });
    }

    let mut rows = SmallVec::new();

    for (program_idx, (program, &value)) in catalog.iter().zip(spot_values).enumerate() {
        let spots_f64 = integral_spots(value)?;
        let spots = spots_f64
            .to_u64()
            .ok_or(SolverError::InvariantViolation {
                message: "spot value does not fit in u64",
            })?;

        let cost_minor = spots
            .to_i64()
            .and_then(|count| program.cost_per_spot.to_minor_units().checked_mul(count))
            .ok_or(SolverError::SpotsOverflow { program_idx, spots })?;

        rows.push(AllocationRow {
            program_idx,
            spots,
            cost: Money::from_minor(cost_minor, catalog.currency()),
            grp: program.rating_per_spot * spots_f64,
        });
    }

    Ok(rows)
}

/// Round a backend value to the integer decision it stands for.
fn integral_spots(value: f64) -> Result<f64, SolverError> {
    if !value.is_finite() {
        return Err(SolverError::InvariantViolation {
            message: "solver returned a non-finite spot value",
        });
    }

    let rounded = value.round();

    if (value - rounded).abs() > INTEGRALITY_TOLERANCE {
        return Err(SolverError::InvariantViolation {
            message: "solver returned a fractional spot value",
        });
    }

    if rounded < 0.0 {
        return Err(SolverError::InvariantViolation {
            message: "solver returned a negative spot value",
        });
    }

    // Normalise `-0.0`.
    Ok(rounded.abs())
}
