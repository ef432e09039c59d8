//! Integration tests for loading plan fixtures from disk

use std::fs;

use decimal_percentage::Percentage;
use rusty_money::iso::IDR;
use tempfile::tempdir;
use testresult::TestResult;

use airtime::{
    fixtures::{Fixture, FixtureError},
    programs::CatalogError,
    solvers::{Solver, ilp::ILPSolver},
};

fn write_plan(root: &std::path::Path, name: &str, contents: &str) -> TestResult {
    let plans = root.join("plans");

    fs::create_dir_all(&plans)?;
    fs::write(plans.join(format!("{name}.yml")), contents)?;

    Ok(())
}

#[test]
fn load_plan_reads_programs_in_file_order() -> TestResult {
    let dir = tempdir()?;

    write_plan(
        dir.path(),
        "custom",
        r#"
budget: "2500 IDR"
prime_time_min_share: 0.4
pib_min_share: "10%"
programs:
  - name: Breakfast
    cost: "250 IDR"
    rating: 0.3
    pib: true
  - name: Drama
    cost: "700 IDR"
    rating: 1.1
    prime_time: true
    max_spots: 2
"#,
    )?;

    let fixture = Fixture::with_base_path(dir.path()).load_plan("custom")?;
    let catalog = fixture.catalog();

    assert_eq!(catalog.currency(), IDR);

    let names: Vec<&str> = catalog.iter().map(|program| program.name.as_str()).collect();
    assert_eq!(names, ["Breakfast", "Drama"]);

    let drama = catalog.get_program(1)?;
    assert!(drama.prime_time);
    assert_eq!(drama.max_spots, Some(2));

    assert_eq!(fixture.request().prime_time_min_share, Percentage::from(0.4));
    assert_eq!(fixture.request().pib_min_share, Percentage::from(0.1));

    let allocation = ILPSolver::plan(catalog, fixture.request())?;
    let drama_spots = allocation.rows().get(1).map(|row| row.spots);

    assert_eq!(drama_spots, Some(2));

    Ok(())
}

#[test]
fn malformed_yaml_is_a_yaml_error() -> TestResult {
    let dir = tempdir()?;

    write_plan(dir.path(), "broken", "budget: [not, a, price\n")?;

    let result = Fixture::with_base_path(dir.path()).load_plan("broken");

    assert!(matches!(result, Err(FixtureError::Yaml(_))));

    Ok(())
}

#[test]
fn unknown_currency_is_rejected() -> TestResult {
    let dir = tempdir()?;

    write_plan(
        dir.path(),
        "doubloons",
        "budget: \"100 XDB\"\nprograms: []\n",
    )?;

    let result = Fixture::with_base_path(dir.path()).load_plan("doubloons");

    assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "XDB"));

    Ok(())
}

#[test]
fn non_finite_rating_is_rejected() -> TestResult {
    let dir = tempdir()?;

    write_plan(
        dir.path(),
        "nan",
        "budget: \"100 IDR\"\nprograms:\n  - name: Static\n    cost: \"10 IDR\"\n    rating: .nan\n",
    )?;

    let result = Fixture::with_base_path(dir.path()).load_plan("nan");

    assert!(matches!(
        result,
        Err(FixtureError::Catalog(CatalogError::InvalidRating(name, _))) if name == "Static"
    ));

    Ok(())
}

#[test]
fn missing_plan_is_an_io_error() -> TestResult {
    let dir = tempdir()?;

    let result = Fixture::with_base_path(dir.path()).load_plan("absent");

    assert!(matches!(result, Err(FixtureError::Io(_))));

    Ok(())
}
