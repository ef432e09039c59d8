//! ILP Typst Renderer
//!
//! This module provides a renderer that captures the spot model and outputs it
//! as a Typst mathematical document.
//!
//! # Example
//!
//! ```rust,no_run
//! use airtime::solvers::ilp::{ILPSolver, renderers::typst::TypstRenderer};
//! use std::path::PathBuf;
//! # use airtime::fixtures::PlanFixture;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let fixture = PlanFixture::from_set("prime_time")?;
//!
//! let mut renderer = TypstRenderer::new_with_catalog(PathBuf::from("formulation.typ"), fixture.catalog());
//!
//! let _allocation = ILPSolver::plan_with_observer(fixture.catalog(), fixture.request(), &mut renderer)?;
//!
//! renderer.write()?;
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use good_lp::{Expression, IntoAffineExpression, Variable};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{programs::Catalog, solvers::ilp::ILPObserver};

/// Captured constraint: (type, expr, relation, rhs).
type CapturedConstraint = (String, Expression, String, f64);

/// Errors that can occur during Typst rendering.
#[derive(Debug, thiserror::Error)]
pub enum TypstRenderError {
    /// Failed to write to the output file.
    #[error("Failed to write to output file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Captured ILP formulation data.
#[derive(Debug, Clone, Default)]
pub struct ILPFormulation {
    /// Spot variables: `program_idx` -> (`var`, `max_spots`)
    pub spot_vars: FxHashMap<usize, (Variable, Option<u32>)>,

    /// Variable display labels (e.g., `x_1`, `x_2`)
    pub var_labels: FxHashMap<Variable, String>,

    /// Objective terms: `var` -> rating per spot
    pub objective_terms: FxHashMap<Variable, f64>,

    /// Constraints in the order they were recorded
    pub constraints: SmallVec<[CapturedConstraint; 3]>,
}

impl ILPFormulation {
    /// Create a new empty formulation.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Typst renderer that implements `ILPObserver`.
#[derive(Debug, Clone)]
pub struct TypstRenderer {
    /// Captured formulation
    formulation: Arc<Mutex<ILPFormulation>>,

    /// Output path for the .typ file
    output_path: PathBuf,

    /// Program index -> program name
    program_names: Vec<String>,
}

impl TypstRenderer {
    /// Create a new Typst renderer.
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            formulation: Arc::new(Mutex::new(ILPFormulation::new())),
            output_path,
            program_names: Vec::new(),
        }
    }

    /// Create a renderer that labels variables with program names.
    pub fn new_with_catalog(output_path: PathBuf, catalog: &Catalog<'_>) -> Self {
        Self {
            formulation: Arc::new(Mutex::new(ILPFormulation::new())),
            output_path,
            program_names: catalog.iter().map(|program| program.name.clone()).collect(),
        }
    }

    /// Get a copy of the captured formulation.
    pub fn formulation(&self) -> ILPFormulation {
        self.formulation.lock().map_or_else(
            |poisoned| poisoned.into_inner().clone(),
            |formulation| formulation.clone(),
        )
    }

    /// Get the output path.
    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Render the captured ILP formulation to Typst syntax.
    pub fn render(&self) -> String {
        let mut output = String::new();
        let formulation = self.formulation();

        output.push_str("= ILP Formulation for Spot Allocation\n\n");

        output.push_str("== Decision Variables\n\n");
        self.render_variables(&formulation, &mut output);

        output.push_str("\n== Objective Function\n\n");
        Self::render_objective(&formulation, &mut output);

        output.push_str("\n== Constraints\n\n");
        Self::render_constraints(&formulation, &mut output);

        output
    }

    /// Write the rendered formulation to the output file.
    ///
    /// # Errors
    ///
    /// Returns [`TypstRenderError::IoError`] if the file cannot be created or written.
    pub fn write(&self) -> Result<(), TypstRenderError> {
        let content = self.render();
        let mut file = File::create(&self.output_path)?;

        file.write_all(content.as_bytes())?;

        Ok(())
    }

    fn program_label(&self, program_idx: usize) -> String {
        let display_idx = program_idx + 1;

        match self.program_names.get(program_idx) {
            Some(name) => format!("Program {display_idx} ({name})"),
            None => format!("Program {display_idx}"),
        }
    }

    fn render_number(value: f64) -> String {
        if (value - value.round()).abs() < 1e-9 {
            format!("{value:.0}")
        } else {
            format!("{value}")
        }
    }

    fn var_label(formulation: &ILPFormulation, var: Variable) -> String {
        formulation
            .var_labels
            .get(&var)
            .cloned()
            .unwrap_or_else(|| format!("{var:?}"))
    }

    /// Variables sorted by their program index, unknown variables last.
    fn sorted_terms(formulation: &ILPFormulation, expr: &Expression) -> Vec<(Variable, f64)> {
        let order: FxHashMap<Variable, usize> = formulation
            .spot_vars
            .iter()
            .map(|(program_idx, (var, _))| (*var, *program_idx))
            .collect();

        let mut terms: Vec<(Variable, f64)> = expr.linear_coefficients().collect();

        terms.sort_by_key(|(var, _)| order.get(var).copied().unwrap_or(usize::MAX));

        terms
    }

    /// Render an Expression to Typst math notation.
    fn render_expression(formulation: &ILPFormulation, expr: &Expression) -> String {
        let mut out = String::new();

        for (var, coeff) in Self::sorted_terms(formulation, expr) {
            if coeff.abs() < f64::EPSILON {
                continue;
            }

            let label = Self::var_label(formulation, var);
            let coeff_abs = coeff.abs();

            let term = if (coeff_abs - 1.0).abs() < f64::EPSILON {
                label
            } else {
                format!("{} {label}", Self::render_number(coeff_abs))
            };

            match (out.is_empty(), coeff < 0.0) {
                (true, true) => out.push_str("- "),
                (true, false) => {}
                (false, true) => out.push_str(" - "),
                (false, false) => out.push_str(" + "),
            }

            out.push_str(&term);
        }

        if out.is_empty() {
            out.push('0');
        }

        out
    }

    fn render_variables(&self, formulation: &ILPFormulation, output: &mut String) {
        output.push_str("All decision variables are non-negative integers (spots bought).\n\n");

        let mut spot_vars: Vec<_> = formulation.spot_vars.iter().collect();

        spot_vars.sort_by_key(|(program_idx, _)| **program_idx);

        for (program_idx, (var, max_spots)) in spot_vars {
            output.push_str("- $");
            output.push_str(&Self::var_label(formulation, *var));
            output.push_str("$: spots on ");
            output.push_str(&self.program_label(*program_idx));

            if let Some(max) = max_spots {
                output.push_str(&format!(", at most {max}"));
            }

            output.push('\n');
        }
    }

    fn render_objective(formulation: &ILPFormulation, output: &mut String) {
        output.push_str("Maximize total GRP:\n\n");

        let objective: Expression = formulation
            .objective_terms
            .iter()
            .map(|(var, coeff)| *var * *coeff)
            .sum();

        output.push_str("$ \"maximize\" quad ");
        output.push_str(&Self::render_expression(formulation, &objective));
        output.push_str(" $\n");
    }

    fn render_constraints(formulation: &ILPFormulation, output: &mut String) {
        if formulation.constraints.is_empty() {
            output.push_str("No constraints.\n");
            return;
        }

        for (constraint_type, expr, relation, rhs) in &formulation.constraints {
            output.push_str("$ ");
            output.push_str(&Self::render_expression(formulation, expr));
            output.push(' ');
            output.push_str(relation);
            output.push(' ');
            output.push_str(&Self::render_number(*rhs));
            output.push_str(" $ (");
            output.push_str(constraint_type);
            output.push_str(")\n\n");
        }

        output.push_str("$ x_i in ZZ, x_i >= 0 $\n");
    }
}

impl ILPObserver for TypstRenderer {
    fn on_spot_variable(&mut self, program_idx: usize, var: Variable, max_spots: Option<u32>) {
        let mut formulation = self
            .formulation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        formulation
            .var_labels
            .insert(var, format!("x_{}", program_idx + 1));

        formulation
            .spot_vars
            .insert(program_idx, (var, max_spots));
    }

    fn on_objective_term(&mut self, var: Variable, coefficient: f64) {
        let mut formulation = self
            .formulation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let entry = formulation.objective_terms.entry(var).or_insert(0.0);

        *entry += coefficient;
    }

    fn on_constraint(
        &mut self,
        constraint_type: &str,
        constraint_expr: &Expression,
        relation: &str,
        rhs: f64,
    ) {
        let mut formulation = self
            .formulation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        formulation.constraints.push((
            constraint_type.to_string(),
            constraint_expr.clone(),
            relation.to_string(),
            rhs,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use decimal_percentage::Percentage;
    use good_lp::{ProblemVariables, variable};
    use rusty_money::{Money, iso::IDR};
    use tempfile::tempdir;
    use testresult::TestResult;

    use crate::{
        plan::PlanRequest,
        programs::Program,
        solvers::ilp::ILPSolver,
    };

    use super::*;

    #[test]
    fn renderer_captures_spot_variables_with_labels() {
        let mut renderer = TypstRenderer::new(PathBuf::from("test.typ"));
        let mut pb = ProblemVariables::new();

        let var1 = pb.add(variable().integer().min(0));
        let var2 = pb.add(variable().integer().min(0));

        renderer.on_spot_variable(0, var1, None);
        renderer.on_spot_variable(1, var2, Some(4));

        let formulation = renderer.formulation();

        assert_eq!(formulation.spot_vars.get(&1), Some(&(var2, Some(4))));
        assert_eq!(formulation.var_labels.get(&var1).map(String::as_str), Some("x_1"));
        assert_eq!(formulation.var_labels.get(&var2).map(String::as_str), Some("x_2"));
    }

    #[test]
    fn render_expression_formats_signs_and_unit_coefficients() {
        let mut renderer = TypstRenderer::new(PathBuf::from("test.typ"));
        let mut pb = ProblemVariables::new();

        let var1 = pb.add(variable().integer().min(0));
        let var2 = pb.add(variable().integer().min(0));

        renderer.on_spot_variable(0, var1, None);
        renderer.on_spot_variable(1, var2, None);

        let expr = var1 * 0.5 + var2 * -0.25;
        let rendered = TypstRenderer::render_expression(&renderer.formulation(), &expr);

        assert_eq!(rendered, "0.5 x_1 - 0.25 x_2");

        let unit = Expression::from(var2);
        let rendered = TypstRenderer::render_expression(&renderer.formulation(), &unit);

        assert_eq!(rendered, "x_2");
    }

    #[test]
    fn render_without_constraints_says_so() {
        let renderer = TypstRenderer::new(PathBuf::from("test.typ"));

        let output = renderer.render();

        assert!(output.contains("= ILP Formulation for Spot Allocation"));
        assert!(output.contains("No constraints."));
    }

    #[test]
    fn plan_with_renderer_writes_full_formulation() -> TestResult {
        let catalog = Catalog::with_programs(
            [
                Program::new("Evening News", Money::from_minor(1_000, IDR), 1.0).prime_time(),
                Program::new("Morning Show", Money::from_minor(500, IDR), 0.5)
                    .pib()
                    .with_max_spots(6),
            ],
            IDR,
        )?;
        let request = PlanRequest::with_budget(Money::from_minor(10_000, IDR))
            .prime_time_share(Percentage::from(0.5));

        let dir = tempdir()?;
        let path = dir.path().join("formulation.typ");
        let mut renderer = TypstRenderer::new_with_catalog(path.clone(), &catalog);

        ILPSolver::plan_with_observer(&catalog, &request, &mut renderer)?;
        renderer.write()?;

        let output = fs::read_to_string(&path)?;

        assert!(output.contains("$x_1$: spots on Program 1 (Evening News)"));
        assert!(output.contains("$x_2$: spots on Program 2 (Morning Show), at most 6"));
        assert!(output.contains("$ \"maximize\" quad x_1 + 0.5 x_2 $"));
        assert!(output.contains("$ 1000 x_1 + 500 x_2 <= 10000 $ (budget)"));
        assert!(output.contains("$ 0.5 x_1 - 0.25 x_2 >= 0 $ (prime_time_share)"));
        assert!(output.contains("(pib_share)"));

        Ok(())
    }
}
