//! Output formatting for generation results.
//!
//! Supports two output formats:
//! - Pretty: the success line plus a coloured per-facade summary
//! - JSON: the full [`GenerationReport`] for scripts and CI

use colored::*;

use crate::generator::{FacadeSummary, GenerationReport};

/// Printed after every successful run in pretty mode.
pub const SUCCESS_MESSAGE: &str = "Facade helpers file generated successfully!";

/// Write the report as pretty-printed JSON on stdout.
pub fn write_json(report: &GenerationReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Write a human-readable summary on stdout.
pub fn write_pretty(report: &GenerationReport, verbose: bool) {
    println!("{}", SUCCESS_MESSAGE.green());

    if !verbose {
        return;
    }

    println!();
    print!("  {}", "Output:  ".dimmed());
    println!("{}", report.output.display());
    print!("  {}", "Scanned: ".dimmed());
    println!(
        "{} files, {} candidates, {} facades",
        report.files_scanned,
        report.candidates,
        report.facades.len()
    );

    if !report.facades.is_empty() {
        println!();
        for facade in &report.facades {
            write_facade(facade);
        }
    }
    println!();
}

fn write_facade(facade: &FacadeSummary) {
    let methods = match facade.methods {
        1 => "1 method".to_string(),
        n => format!("{} methods", n),
    };
    println!(
        "  {} {} {} {}",
        facade.class.cyan(),
        "->".dimmed(),
        facade.service,
        format!("({}, {})", facade.accessor, methods).dimmed()
    );
}
