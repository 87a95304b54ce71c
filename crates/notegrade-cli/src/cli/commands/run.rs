use super::runner_builder::{apply_overrides, build_runner, resolve_config};
use crate::cli::args::{OutputFormat, RunArgs};
use crate::exit_codes;
use crate::loader;
use notegrade_core::engine::BatchOutcome;
use notegrade_core::report::console::{default_progress_sink, print_outcome};
use notegrade_core::report::json::{write_json, OutcomeDocument};
use notegrade_core::report::summarize;
use tracing::info;

pub(crate) fn exit_code_for(outcome: &BatchOutcome) -> i32 {
    if outcome.is_partial || outcome.has_failures() {
        exit_codes::INCOMPLETE
    } else {
        exit_codes::SUCCESS
    }
}

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let (mut cfg, cfg_path) = resolve_config(args.config.as_deref())?;
    apply_overrides(&mut cfg, &args);
    if let Some(p) = &cfg_path {
        info!(config = %p.display(), "loaded config");
    }

    let groups = loader::load_groups(&args.input, &cfg.reference_names)?;
    let runner = build_runner(&cfg)?;

    let expected_tasks: usize = groups
        .iter()
        .filter(|g| g.reference_text.is_some())
        .map(|g| g.variants.len())
        .sum();
    let progress = default_progress_sink(expected_tasks);

    let outcome = match runner.run_batch(&groups, progress).await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("fatal: {e}");
            return Ok(exit_codes::BATCH_ABORTED);
        }
    };

    let code = exit_code_for(&outcome);
    let report = summarize(&outcome.records);
    let doc = OutcomeDocument::new(outcome, report);

    if let Some(out) = &args.out {
        write_json(&doc, out)?;
        info!(path = %out.display(), "wrote outcome document");
    }

    match args.format {
        OutputFormat::Text => print_outcome(&doc.outcome, &doc.report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
    }

    Ok(code)
}
