//! ILP Solver

use good_lp::{Expression, Variable};
use num_traits::ToPrimitive;
use tracing::{Span, debug, warn};

use crate::{
    allocation::Allocation,
    plan::{PlanRequest, share_fraction},
    programs::{Catalog, Program},
    solvers::{Solver, SolverError},
};

pub mod backend;
pub mod observer;
pub mod renderers;
pub mod state;

pub use backend::{GoodLpBackend, ILPBackend, SolveOutcome, SolveStatus, SpotValues};
pub use observer::{ILPObserver, NoopObserver};
pub use state::{ConstraintRelation, ILPConstraint, ILPState, SpotModel};

/// Solver using Integer Linear Programming (ILP)
#[derive(Debug)]
pub struct ILPSolver;

/// Validated solver coefficients for a request.
#[derive(Debug, Clone, Copy)]
struct RequestCoefficients {
    budget: f64,
    prime_time_share: f64,
    pib_share: f64,
}

impl ILPSolver {
    /// Plan with an observer for capturing the ILP formulation.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] if the request is rejected or the solver finds no solution.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use airtime::solvers::ilp::{ILPSolver, renderers::typst::TypstRenderer};
    /// use std::path::PathBuf;
    /// # use airtime::fixtures::PlanFixture;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let fixture = PlanFixture::from_set("prime_time")?;
    ///
    /// let mut renderer =
    ///     TypstRenderer::new_with_catalog(PathBuf::from("formulation.typ"), fixture.catalog());
    /// let allocation =
    ///     ILPSolver::plan_with_observer(fixture.catalog(), fixture.request(), &mut renderer)?;
    /// renderer.write()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn plan_with_observer<'a>(
        catalog: &Catalog<'a>,
        request: &PlanRequest<'a>,
        observer: &mut dyn ILPObserver,
    ) -> Result<Allocation<'a>, SolverError> {
        Self::plan_with_backend(catalog, request, &GoodLpBackend, observer)
    }

    /// Plan using a specific backend.
    ///
    /// Requests are validated before the model is built, so the backend is never
    /// invoked for a rejected request.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] if the request is rejected or the backend finds no solution.
    #[tracing::instrument(
        name = "airtime.plan",
        skip_all,
        fields(
            programs = catalog.len(),
            budget = %request.budget,
            prime_time_share = ?request.prime_time_min_share,
            pib_share = ?request.pib_min_share,
            status = tracing::field::Empty
        )
    )]
    pub fn plan_with_backend<'a>(
        catalog: &Catalog<'a>,
        request: &PlanRequest<'a>,
        backend: &dyn ILPBackend,
        observer: &mut dyn ILPObserver,
    ) -> Result<Allocation<'a>, SolverError> {
        let coefficients = validate_request(catalog, request).inspect_err(|err| {
            warn!(error = %err, "rejected plan request");
        })?;

        let model = build_model(catalog, coefficients, observer)?;

        ensure_spot_vars_len(model.len(), catalog.len())?;

        let outcome = backend.solve(model);

        debug!(outcome = ?outcome, "backend finished");

        let (status, spot_values) = outcome.into_accepted().inspect_err(|err| {
            warn!(error = %err, "no usable solution");
        })?;

        Span::current().record("status", tracing::field::debug(status));

        let allocation = Allocation::from_spot_values(catalog, status, &spot_values)?;

        debug!(
            total_cost = %allocation.metrics().total_cost,
            total_grp = %allocation.metrics().total_grp,
            "plan complete"
        );

        Ok(allocation)
    }
}

impl Solver for ILPSolver {
    fn plan<'a>(
        catalog: &Catalog<'a>,
        request: &PlanRequest<'a>,
    ) -> Result<Allocation<'a>, SolverError> {
        let mut observer = NoopObserver;

        Self::plan_with_backend(catalog, request, &GoodLpBackend, &mut observer)
    }
}

/// Reject requests that cannot be turned into a bounded model.
fn validate_request(
    catalog: &Catalog<'_>,
    request: &PlanRequest<'_>,
) -> Result<RequestCoefficients, SolverError> {
    if catalog.is_empty() {
        return Err(SolverError::EmptyCatalog);
    }

    let budget_currency = request.budget.currency();

    if budget_currency != catalog.currency() {
        return Err(SolverError::CurrencyMismatch {
            budget: budget_currency.iso_alpha_code,
            catalog: catalog.currency().iso_alpha_code,
        });
    }

    let budget_minor = request.budget.to_minor_units();

    if budget_minor < 0 {
        return Err(SolverError::NegativeBudget);
    }

    let prime_time_share = share_fraction(request.prime_time_min_share)
        .ok_or(SolverError::InvalidShare { name: "prime time" })?;

    let pib_share =
        share_fraction(request.pib_min_share).ok_or(SolverError::InvalidShare { name: "PIB" })?;

    // A free spot with positive rating lets the objective grow without limit.
    for (program_idx, program) in catalog.iter().enumerate() {
        if program.rating_per_spot > 0.0
            && program.cost_per_spot.to_minor_units() == 0
            && program.max_spots.is_none()
        {
            return Err(SolverError::UnboundedProgram { program_idx });
        }
    }

    Ok(RequestCoefficients {
        budget: minor_units_coefficient(budget_minor)?,
        prime_time_share,
        pib_share,
    })
}

/// Build the spot model: variables, GRP objective, budget and share constraints.
fn build_model(
    catalog: &Catalog<'_>,
    coefficients: RequestCoefficients,
    observer: &mut dyn ILPObserver,
) -> Result<SpotModel, SolverError> {
    let mut state = ILPState::new();

    let spots = build_spot_variables_and_objective(catalog, &mut state, observer);

    add_budget_constraint(catalog, &spots, coefficients.budget, &mut state, observer)?;

    add_share_constraint(
        catalog,
        &spots,
        ShareClass::PrimeTime,
        coefficients.prime_time_share,
        &mut state,
        observer,
    );

    add_share_constraint(
        catalog,
        &spots,
        ShareClass::Pib,
        coefficients.pib_share,
        &mut state,
        observer,
    );

    Ok(state.into_model())
}

/// Create one integer spot variable per program and the total GRP objective.
fn build_spot_variables_and_objective<O: ILPObserver + ?Sized>(
    catalog: &Catalog<'_>,
    state: &mut ILPState,
    observer: &mut O,
) -> Vec<Variable> {
    let mut spots = Vec::with_capacity(catalog.len());

    for (program_idx, program) in catalog.iter().enumerate() {
        let var = state.add_spot_variable(program.max_spots);

        state.add_to_objective(var, program.rating_per_spot);

        observer.on_spot_variable(program_idx, var, program.max_spots);
        observer.on_objective_term(var, program.rating_per_spot);

        spots.push(var);
    }

    spots
}

/// `Σ cost_i × spots_i <= budget`, in minor units.
fn add_budget_constraint<O: ILPObserver + ?Sized>(
    catalog: &Catalog<'_>,
    spots: &[Variable],
    budget: f64,
    state: &mut ILPState,
    observer: &mut O,
) -> Result<(), SolverError> {
    let mut spend = Expression::default();

    for (program, &var) in catalog.iter().zip(spots) {
        let cost = minor_units_coefficient(program.cost_per_spot.to_minor_units())?;

        spend += var * cost;
    }

    observer.on_constraint("budget", &spend, ConstraintRelation::Leq.as_str(), budget);
    state.add_leq_constraint(spend, budget);

    Ok(())
}

/// Inventory class with a minimum share of total GRP.
#[derive(Debug, Clone, Copy)]
enum ShareClass {
    PrimeTime,
    Pib,
}

impl ShareClass {
    fn contains(self, program: &Program<'_>) -> bool {
        match self {
            ShareClass::PrimeTime => program.prime_time,
            ShareClass::Pib => program.pib,
        }
    }

    fn constraint_type(self) -> &'static str {
        match self {
            ShareClass::PrimeTime => "prime_time_share",
            ShareClass::Pib => "pib_share",
        }
    }
}

/// `class_grp - share × total_grp >= 0`.
///
/// Both sides are linear in the same spot variables, so the coefficient for a program
/// is `rating × ([in class] - share)`.
fn add_share_constraint<O: ILPObserver + ?Sized>(
    catalog: &Catalog<'_>,
    spots: &[Variable],
    class: ShareClass,
    share: f64,
    state: &mut ILPState,
    observer: &mut O,
) {
    let mut surplus = Expression::default();

    for (program, &var) in catalog.iter().zip(spots) {
        let membership = if class.contains(program) { 1.0 } else { 0.0 };

        surplus += var * (program.rating_per_spot * (membership - share));
    }

    observer.on_constraint(
        class.constraint_type(),
        &surplus,
        ConstraintRelation::Geq.as_str(),
        0.0,
    );
    state.add_geq_constraint(surplus, 0.0);
}

/// Ensure that the number of spot variables matches the number of programs.
fn ensure_spot_vars_len(vars_len: usize, programs_len: usize) -> Result<(), SolverError> {
    if vars_len != programs_len {
        return Err(SolverError::InvariantViolation {
            message: "spot variable count does not match number of programs",
        });
    }

    Ok(())
}

fn minor_units_coefficient(minor_units: i64) -> Result<f64, SolverError> {
    // `good_lp` stores coefficients as `f64`; refuse amounts that would silently change.
    i64_to_f64_exact(minor_units).ok_or(SolverError::MinorUnitsNotRepresentable(minor_units))
}

/// Convert an `i64` to `f64` only if the conversion is exact.
fn i64_to_f64_exact(v: i64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_i64() == Some(v)).then_some(f)
}
