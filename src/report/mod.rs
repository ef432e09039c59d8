//! Plan Report
//!
//! Renders an [`Allocation`] as a results table followed by the summary metrics.

use std::{fmt::Write, io};

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    allocation::{Allocation, AllocationRow},
    programs::{Catalog, CatalogError},
};

/// Errors that can occur when writing a plan report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A row refers to a program missing from the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Printable view of an allocation against its catalog.
#[derive(Debug, Clone, Copy)]
pub struct PlanReport<'r, 'a> {
    catalog: &'r Catalog<'a>,
    allocation: &'r Allocation<'a>,
}

impl<'r, 'a> PlanReport<'r, 'a> {
    /// Create a report for an allocation planned over `catalog`.
    pub fn new(catalog: &'r Catalog<'a>, allocation: &'r Allocation<'a>) -> Self {
        Self {
            catalog,
            allocation,
        }
    }

    /// Write the results and metrics tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if a row refers to a missing program or the output
    /// cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        let mut builder = Builder::default();

        push_results_header(&mut builder);

        for row in self.allocation.rows() {
            push_result_row(&mut builder, self.catalog, row)?;
        }

        write_table(&mut out, builder, 1)?;

        let mut builder = Builder::default();

        push_metrics_rows(&mut builder, self.allocation);

        write_table(&mut out, builder, 0)?;

        writeln!(out)?;

        Ok(())
    }
}

fn push_results_header(builder: &mut Builder) {
    builder.push_record([
        "Program",
        "Nett/Spot",
        "TV Rating",
        "Prime Time",
        "PIB",
        "Spot",
        "Cost",
        "GRP",
    ]);
}

fn push_result_row(
    builder: &mut Builder,
    catalog: &Catalog<'_>,
    row: &AllocationRow<'_>,
) -> Result<(), ReportError> {
    let program = catalog.get_program(row.program_idx)?;

    builder.push_record([
        program.name.clone(),
        format!("{}", program.cost_per_spot),
        format!("{:.2}", program.rating_per_spot),
        flag(program.prime_time).to_string(),
        flag(program.pib).to_string(),
        row.spots.to_string(),
        format!("{}", row.cost),
        format!("{:.2}", row.grp),
    ]);

    Ok(())
}

fn push_metrics_rows(builder: &mut Builder, allocation: &Allocation<'_>) {
    let metrics = allocation.metrics();

    builder.push_record(["Total Cost".to_string(), format!("{}", metrics.total_cost)]);
    builder.push_record(["Total GRP".to_string(), group_thousands(metrics.total_grp)]);
    builder.push_record([
        "Prime Time %".to_string(),
        format!("{:.2}%", metrics.prime_time_percent),
    ]);
    builder.push_record(["PIB %".to_string(), format!("{:.2}%", metrics.pib_percent)]);
}

/// Build the table from `builder` and write it; a separator follows `header_rows` rows.
fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    header_rows: usize,
) -> Result<(), ReportError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();

    if header_rows > 0 {
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.insert_horizontal_line(header_rows, separator);
        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..), Alignment::right());
    } else {
        table.with(theme);
        table.modify(Columns::first(), Color::BOLD);
        table.modify(Columns::new(1..), Alignment::right());
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}")?;

    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Format a decimal with two decimal places and `,` between thousands.
fn group_thousands(value: Decimal) -> String {
    let formatted = format!("{value:.2}");

    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);

    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }

        grouped.push(digit);
    }

    format!("{sign}{grouped}.{fraction}")
}

/// Wraps runs of box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}
