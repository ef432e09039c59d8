//! Integration tests for rendering plan reports

use rusty_money::Money;
use testresult::TestResult;

use airtime::{
    fixtures::PlanFixture,
    report::PlanReport,
    solvers::{Solver, ilp::ILPSolver},
};

#[test]
fn weekly_report_lists_every_program_and_metric() -> TestResult {
    let fixture = PlanFixture::from_set("weekly")?;
    let allocation = ILPSolver::plan(fixture.catalog(), fixture.request())?;

    let mut out = Vec::new();
    PlanReport::new(fixture.catalog(), &allocation).write_to(&mut out)?;

    let output = String::from_utf8(out)?;

    for program in fixture.catalog().iter() {
        assert!(output.contains(&program.name), "missing {}", program.name);
    }

    for label in ["Total Cost", "Total GRP", "Prime Time %", "PIB %"] {
        assert!(output.contains(label), "missing {label}");
    }

    let metrics = allocation.metrics();

    assert!(
        output.contains(&format!("{}", metrics.total_cost)),
        "missing total cost"
    );
    assert!(
        output.contains(&format!("{:.2}%", metrics.prime_time_percent)),
        "missing prime time percent"
    );

    Ok(())
}

#[test]
fn empty_plan_report_shows_zero_percentages() -> TestResult {
    let fixture = PlanFixture::from_set("zero_budget")?;
    let allocation = ILPSolver::plan(fixture.catalog(), fixture.request())?;

    let mut out = Vec::new();
    PlanReport::new(fixture.catalog(), &allocation).write_to(&mut out)?;

    let output = String::from_utf8(out)?;

    assert!(output.contains("0.00%"), "missing zero percent");
    assert!(
        output.contains(&format!(
            "{}",
            Money::from_minor(0, fixture.catalog().currency())
        )),
        "missing zero total cost"
    );

    Ok(())
}
