//! ILP Observer

use good_lp::{Expression, Variable};

/// Observer trait for capturing the spot model as it's built.
///
/// The solver stays the only place the model is constructed; observers passively
/// record variables, objective terms and constraints for rendering or analysis.
pub trait ILPObserver: Send + Sync {
    /// Called when the spot variable for a program is created.
    ///
    /// # Parameters
    ///
    /// - `program_idx`: Index of the program in the catalog
    /// - `var`: The integer decision variable
    /// - `max_spots`: Upper bound on the variable, if the program is capped
    fn on_spot_variable(&mut self, program_idx: usize, var: Variable, max_spots: Option<u32>);

    /// Called when a term is added to the objective function.
    ///
    /// # Parameters
    ///
    /// - `var`: The decision variable
    /// - `coefficient`: Rating points delivered per spot
    fn on_objective_term(&mut self, _var: Variable, _coefficient: f64) {}

    /// Called when a constraint is recorded.
    ///
    /// # Parameters
    ///
    /// - `constraint_type`: Human-readable constraint type (e.g., `"budget"`, `"prime_time_share"`)
    /// - `constraint_expr`: The left-hand side expression
    /// - `relation`: Relation operator (`"<="` or `">="`)
    /// - `rhs`: Right-hand side value
    fn on_constraint(
        &mut self,
        constraint_type: &str,
        constraint_expr: &Expression,
        relation: &str,
        rhs: f64,
    );
}

/// No-op observer for unobserved solves.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ILPObserver for NoopObserver {
    fn on_spot_variable(&mut self, _: usize, _: Variable, _: Option<u32>) {}

    fn on_constraint(&mut self, _: &str, _: &Expression, _: &str, _: f64) {}
}
