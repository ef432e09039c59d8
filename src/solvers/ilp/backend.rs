//! ILP Backends
//!
//! A backend takes a built [`SpotModel`] and reports what the underlying MILP solver
//! found. The default backend goes through `good_lp`; any other solver can be plugged
//! in by implementing [`ILPBackend`].

use good_lp::{ResolutionError, Solution, SolverModel};
use smallvec::SmallVec;

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::solvers::{
    SolverError,
    ilp::state::{ConstraintRelation, ILPConstraint, SpotModel},
};

/// Raw spot values reported by a backend, in catalog order.
pub type SpotValues = SmallVec<[f64; 10]>;

/// Status of an accepted solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal
    Optimal,

    /// Feasible, but not proven optimal (e.g. the backend hit a limit)
    Feasible,
}

/// What a backend reports after a single solve attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Proven optimal integer solution
    Optimal(SpotValues),

    /// Feasible integer solution found within the backend's limits
    Feasible(SpotValues),

    /// No assignment satisfies every constraint
    Infeasible,

    /// The objective can grow without limit
    Unbounded,

    /// Backend-internal failure
    Error(String),
}

impl SolveOutcome {
    /// Accept optimal and feasible outcomes alike; everything else is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Infeasible`] for infeasible models and
    /// [`SolverError::Backend`] for unbounded models or backend failures.
    pub fn into_accepted(self) -> Result<(SolveStatus, SpotValues), SolverError> {
        match self {
            SolveOutcome::Optimal(spots) => Ok((SolveStatus::Optimal, spots)),
            SolveOutcome::Feasible(spots) => Ok((SolveStatus::Feasible, spots)),
            SolveOutcome::Infeasible => Err(SolverError::Infeasible),
            SolveOutcome::Unbounded => Err(SolverError::Backend {
                reason: "model is unbounded".to_string(),
            }),
            SolveOutcome::Error(reason) => Err(SolverError::Backend { reason }),
        }
    }
}

/// A MILP solver capable of maximising a [`SpotModel`].
pub trait ILPBackend {
    /// Run one blocking solve.
    fn solve(&self, model: SpotModel) -> SolveOutcome;
}

/// Backend using the `good_lp` solver selected by cargo features.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoodLpBackend;

impl ILPBackend for GoodLpBackend {
    fn solve(&self, model: SpotModel) -> SolveOutcome {
        let (pb, grp, spots, constraints) = model.into_parts();

        let problem = apply_recorded_constraints(pb.maximise(grp).using(default_solver), constraints);

        match problem.solve() {
            // `good_lp` only hands back a solution once the search finished.
            Ok(solution) => {
                SolveOutcome::Optimal(spots.iter().map(|&var| solution.value(var)).collect())
            }
            Err(ResolutionError::Infeasible) => SolveOutcome::Infeasible,
            Err(ResolutionError::Unbounded) => SolveOutcome::Unbounded,
            Err(other) => SolveOutcome::Error(other.to_string()),
        }
    }
}

fn apply_recorded_constraints<S: SolverModel>(mut model: S, constraints: Vec<ILPConstraint>) -> S {
    for constraint in constraints {
        if constraint.is_trivially_satisfied() {
            continue;
        }

        model = match constraint.relation {
            ConstraintRelation::Leq => model.with(constraint.lhs.leq(constraint.rhs)),
            ConstraintRelation::Geq => model.with(constraint.lhs.geq(constraint.rhs)),
        };
    }

    model
}

#[cfg(test)]
mod tests {
    use good_lp::Expression;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::solvers::ilp::state::ILPState;

    use super::*;

    #[test]
    fn optimal_and_feasible_are_both_accepted() -> TestResult {
        let (optimal_status, optimal) = SolveOutcome::Optimal(smallvec![1.0, 2.0]).into_accepted()?;
        let (feasible_status, feasible) =
            SolveOutcome::Feasible(smallvec![1.0, 2.0]).into_accepted()?;

        assert_eq!(optimal_status, SolveStatus::Optimal);
        assert_eq!(feasible_status, SolveStatus::Feasible);
        assert_eq!(optimal, feasible);

        Ok(())
    }

    #[test]
    fn infeasible_maps_to_infeasible_error() {
        let err = SolveOutcome::Infeasible.into_accepted().err();

        assert!(matches!(err, Some(SolverError::Infeasible)));
    }

    #[test]
    fn unbounded_and_errors_map_to_backend_error() {
        let unbounded = SolveOutcome::Unbounded.into_accepted().err();
        let failed = SolveOutcome::Error("numerical trouble".to_string())
            .into_accepted()
            .err();

        assert!(matches!(unbounded, Some(SolverError::Backend { .. })));
        assert!(matches!(
            failed,
            Some(SolverError::Backend { reason }) if reason == "numerical trouble"
        ));
    }

    #[test]
    fn good_lp_backend_maximises_within_bound() -> TestResult {
        let mut state = ILPState::new();
        let var = state.add_spot_variable(None);
        state.add_to_objective(var, 2.0);
        state.add_leq_constraint(var * 3.0, 10.0);

        let outcome = GoodLpBackend.solve(state.into_model());

        let SolveOutcome::Optimal(spots) = outcome else {
            return Err(format!("expected optimal outcome, got {outcome:?}").into());
        };

        assert_eq!(spots.len(), 1);
        assert!(spots.iter().all(|spot| (spot - 3.0).abs() < 1e-6));

        Ok(())
    }

    #[test]
    fn good_lp_backend_reports_infeasible_model() {
        let mut state = ILPState::new();
        let var = state.add_spot_variable(Some(2));
        state.add_to_objective(var, 1.0);
        state.add_geq_constraint(Expression::from(var), 5.0);

        let outcome = GoodLpBackend.solve(state.into_model());

        assert_eq!(outcome, SolveOutcome::Infeasible);
    }
}
