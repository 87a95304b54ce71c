use crate::cli::args::{OutputFormat, SummarizeArgs};
use crate::exit_codes;
use notegrade_core::report::console::render_report;
use notegrade_core::report::json::read_json;
use notegrade_core::report::summarize;

/// Recomputes the report from stored records; the stored report is not trusted.
pub fn run(args: SummarizeArgs) -> anyhow::Result<i32> {
    let doc = read_json(&args.results)?;
    let report = summarize(&doc.outcome.records);
    if report != doc.report {
        tracing::warn!(
            path = %args.results.display(),
            "stored report differs from recomputed report; showing recomputed"
        );
    }

    match args.format {
        OutputFormat::Text => print!("{}", render_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(exit_codes::SUCCESS)
}
