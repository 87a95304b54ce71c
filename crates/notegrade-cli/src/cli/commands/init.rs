use crate::cli::args::InitArgs;
use crate::exit_codes;
use anyhow::Context;
use notegrade_core::config::write_sample_config;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.path.exists() && !args.force {
        println!("   Skipped {} (exists, use --force to overwrite)", args.path.display());
        return Ok(exit_codes::SUCCESS);
    }
    write_sample_config(&args.path)
        .with_context(|| format!("failed to write {}", args.path.display()))?;
    println!("   Created {}", args.path.display());
    Ok(exit_codes::SUCCESS)
}
