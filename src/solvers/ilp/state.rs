//! ILP State

use std::fmt;

use good_lp::{Expression, IntoAffineExpression, ProblemVariables, Variable, variable};
use smallvec::SmallVec;

/// Relation operator for a linear ILP constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRelation {
    /// Less than or equal (`lhs <= rhs`)
    Leq,

    /// Greater than or equal (`lhs >= rhs`)
    Geq,
}

impl ConstraintRelation {
    /// Operator symbol used by observers and renderers.
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintRelation::Leq => "<=",
            ConstraintRelation::Geq => ">=",
        }
    }
}

/// Recorded linear ILP constraint emitted during model construction.
#[derive(Debug, Clone)]
pub struct ILPConstraint {
    /// Left-hand side expression
    pub lhs: Expression,

    /// Relation operator
    pub relation: ConstraintRelation,

    /// Right-hand side scalar
    pub rhs: f64,
}

impl ILPConstraint {
    /// Whether the constraint has no variable terms and holds for any assignment.
    ///
    /// Some backends reject rows without coefficients, so these are skipped when
    /// the model is handed over.
    pub fn is_trivially_satisfied(&self) -> bool {
        let lhs = &self.lhs;

        let has_terms = lhs
            .linear_coefficients()
            .any(|(_var, coeff)| coeff.abs() >= f64::EPSILON);

        if has_terms {
            return false;
        }

        let constant = lhs.constant();

        match self.relation {
            ConstraintRelation::Leq => constant <= self.rhs,
            ConstraintRelation::Geq => constant >= self.rhs,
        }
    }
}

/// Builder state for ILP problem variables, objective and constraints
pub struct ILPState {
    pb: ProblemVariables,
    grp: Expression,
    spots: SmallVec<[Variable; 10]>,
    constraints: Vec<ILPConstraint>,
}

impl fmt::Debug for ILPState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ILPState")
            .field("pb", &"<ProblemVariables>")
            .field("grp", &"<Expression>")
            .field("spots", &format!("[{} variables]", self.spots.len()))
            .field(
                "constraints",
                &format!("[{} constraints]", self.constraints.len()),
            )
            .finish()
    }
}

impl Default for ILPState {
    fn default() -> Self {
        Self::new()
    }
}

impl ILPState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self {
            pb: ProblemVariables::new(),
            grp: Expression::default(),
            spots: SmallVec::new(),
            constraints: Vec::new(),
        }
    }

    /// Add a non-negative integer spot variable, optionally capped from above.
    ///
    /// Spot variables are kept in creation order, so the n-th variable belongs to
    /// the n-th program in the catalog.
    pub fn add_spot_variable(&mut self, max_spots: Option<u32>) -> Variable {
        let definition = variable().integer().min(0);

        let var = match max_spots {
            Some(max) => self.pb.add(definition.max(max)),
            None => self.pb.add(definition),
        };

        self.spots.push(var);

        var
    }

    /// Add a term to the objective function (total GRP)
    pub fn add_to_objective(&mut self, var: Variable, coefficient: f64) {
        self.grp += var * coefficient;
    }

    /// Record a less-than-or-equal constraint.
    pub fn add_leq_constraint(&mut self, lhs: Expression, rhs: f64) {
        self.add_constraint(lhs, ConstraintRelation::Leq, rhs);
    }

    /// Record a greater-than-or-equal constraint.
    pub fn add_geq_constraint(&mut self, lhs: Expression, rhs: f64) {
        self.add_constraint(lhs, ConstraintRelation::Geq, rhs);
    }

    fn add_constraint(&mut self, lhs: Expression, relation: ConstraintRelation, rhs: f64) {
        self.constraints.push(ILPConstraint { lhs, relation, rhs });
    }

    /// Spot variables created so far, in catalog order.
    pub fn spot_variables(&self) -> &[Variable] {
        &self.spots
    }

    /// Finish building and hand over the model.
    pub fn into_model(self) -> SpotModel {
        SpotModel {
            pb: self.pb,
            grp: self.grp,
            spots: self.spots,
            constraints: self.constraints,
        }
    }
}

/// A fully built spot allocation model, ready to be handed to a backend.
///
/// Each model belongs to exactly one planning run and is consumed by the solve.
pub struct SpotModel {
    pb: ProblemVariables,
    grp: Expression,
    spots: SmallVec<[Variable; 10]>,
    constraints: Vec<ILPConstraint>,
}

impl fmt::Debug for SpotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotModel")
            .field("spots", &format!("[{} variables]", self.spots.len()))
            .field(
                "constraints",
                &format!("[{} constraints]", self.constraints.len()),
            )
            .finish_non_exhaustive()
    }
}

impl SpotModel {
    /// Spot variables in catalog order.
    pub fn spot_variables(&self) -> &[Variable] {
        &self.spots
    }

    /// The objective to maximise (total GRP).
    pub fn objective(&self) -> &Expression {
        &self.grp
    }

    /// Recorded constraints.
    pub fn constraints(&self) -> &[ILPConstraint] {
        &self.constraints
    }

    /// Number of spot variables in the model.
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// Check if the model has no spot variables.
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Extract the problem variables, objective, spot variables and constraints.
    pub fn into_parts(
        self,
    ) -> (
        ProblemVariables,
        Expression,
        SmallVec<[Variable; 10]>,
        Vec<ILPConstraint>,
    ) {
        (self.pb, self.grp, self.spots, self.constraints)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use good_lp::Solution;

    use super::*;

    #[test]
    fn debug_includes_spot_and_constraint_counts() {
        let mut state = ILPState::new();
        let var = state.add_spot_variable(None);
        state.add_leq_constraint(Expression::from(var), 1.0);

        let formatted = format!("{state:?}");

        assert!(formatted.contains("ILPState"));
        assert!(formatted.contains("1 variables"));
        assert!(formatted.contains("1 constraints"));
    }

    #[test]
    fn spot_variables_keep_creation_order() {
        let mut state = ILPState::new();
        let first = state.add_spot_variable(None);
        let second = state.add_spot_variable(Some(3));

        let model = state.into_model();

        assert_eq!(model.spot_variables(), &[first, second]);
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn objective_accumulates_terms() {
        let mut state = ILPState::new();
        let a = state.add_spot_variable(None);
        let b = state.add_spot_variable(None);
        state.add_to_objective(a, 1.5);
        state.add_to_objective(b, 0.5);

        let model = state.into_model();
        let solution: HashMap<Variable, f64> = [(a, 2.0), (b, 4.0)].into_iter().collect();

        assert!((solution.eval(model.objective()) - 5.0).abs() <= f64::EPSILON);
    }

    #[test]
    fn constraints_record_relation() {
        let mut state = ILPState::new();
        let var = state.add_spot_variable(None);
        state.add_leq_constraint(Expression::from(var), 2.0);
        state.add_geq_constraint(Expression::from(var), 0.0);

        let model = state.into_model();
        let relations: Vec<&str> = model
            .constraints()
            .iter()
            .map(|c| c.relation.as_str())
            .collect();

        assert_eq!(relations, ["<=", ">="]);
    }

    #[test]
    fn empty_geq_zero_constraint_is_trivial() {
        let mut state = ILPState::new();
        let var = state.add_spot_variable(None);
        state.add_geq_constraint(var * 0.0, 0.0);
        state.add_geq_constraint(Expression::from(var), 0.0);
        state.add_leq_constraint(Expression::default(), -1.0);

        let model = state.into_model();
        let trivial: Vec<bool> = model
            .constraints()
            .iter()
            .map(ILPConstraint::is_trivially_satisfied)
            .collect();

        assert_eq!(trivial, [true, false, false]);
    }
}
