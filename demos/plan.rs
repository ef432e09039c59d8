//! Spot Plan Example
//!
//! This example plans a TV spot buy from a fixture set and prints the report.
//!
//! Use `-f` to load a fixture set by name
//! Use `-o` to specify the filename of a typst formatted output file in `target/ilp-formulations`
//! Use `--budget`, `--prime-time-share` and `--pib-share` to override the fixture's request
//!
//! Set `RUST_LOG=airtime=debug` to see solver logs.

use std::{fs::create_dir_all, io, io::Write, path::PathBuf, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use airtime::{
    fixtures::PlanFixture,
    report::PlanReport,
    solvers::{
        Solver,
        ilp::{ILPSolver, renderers::typst::TypstRenderer},
    },
    utils::PlanArgs,
};

/// Spot Plan Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .init();

    let args = PlanArgs::parse();

    let fixture = args.apply_overrides(PlanFixture::from_set(&args.fixture)?)?;
    let catalog = fixture.catalog();
    let request = fixture.request();

    let start = Instant::now();

    let allocation = if let Some(out) = args.out.as_deref() {
        let output_dir = PathBuf::from("target").join("ilp-formulations");

        create_dir_all(&output_dir)?;

        let mut renderer = TypstRenderer::new_with_catalog(output_dir.join(out), catalog);

        let allocation = ILPSolver::plan_with_observer(catalog, request, &mut renderer)?;

        renderer.write()?;

        println!(
            "\nILP formulation written to: {}",
            renderer.output_path().display()
        );

        allocation
    } else {
        ILPSolver::plan(catalog, request)?
    };

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    PlanReport::new(catalog, &allocation).write_to(&mut handle)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
