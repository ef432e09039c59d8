//! Airtime prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{Allocation, AllocationRow, SummaryMetrics},
    fixtures::{Fixture, FixtureError, PlanFixture},
    plan::PlanRequest,
    programs::{Catalog, CatalogError, Program},
    report::{PlanReport, ReportError},
    solvers::{
        Solver, SolverError,
        ilp::{
            GoodLpBackend, ILPBackend, ILPObserver, ILPSolver, NoopObserver, SolveOutcome,
            SolveStatus,
            renderers::typst::{TypstRenderError, TypstRenderer},
        },
    },
};
