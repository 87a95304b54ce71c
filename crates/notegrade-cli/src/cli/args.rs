use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "notegrade",
    version,
    about = "Score clinical note variants against their source transcripts with an LLM judge"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Judge every variant in an input folder, rank per group and compare across groups
    Run(RunArgs),
    /// Recompute the comparison report from a written results file
    Summarize(SummarizeArgs),
    /// Write a sample notegrade.yaml
    Init(InitArgs),
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
pub struct JudgeArgs {
    /// Judge provider
    /// - openai: live calls (needs OPENAI_API_KEY)
    /// - fake: deterministic word-overlap judge (tests/dev)
    #[arg(long, env = "NOTEGRADE_JUDGE")]
    pub judge: Option<String>,

    /// Judge model identifier (provider-specific)
    /// Example: gpt-4o-mini
    #[arg(long, env = "NOTEGRADE_JUDGE_MODEL")]
    pub judge_model: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Folder with one sub-folder per group
    #[arg(long)]
    pub input: PathBuf,

    /// Defaults to ./notegrade.yaml when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub judge: JudgeArgs,

    /// Write the outcome document (JSON) here
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Skip inter-task delays
    #[arg(long)]
    pub no_delay: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SummarizeArgs {
    #[arg(long)]
    pub results: PathBuf,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "notegrade.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_parse_with_defaults() {
        let cli = Cli::try_parse_from(["notegrade", "run", "--input", "visits"]).unwrap();
        let Command::Run(args) = cli.cmd else {
            panic!("expected run");
        };
        assert_eq!(args.input, PathBuf::from("visits"));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.config.is_none());
        assert!(!args.no_delay);
    }

    #[test]
    fn run_requires_input() {
        assert!(Cli::try_parse_from(["notegrade", "run"]).is_err());
    }

    #[test]
    fn format_is_restricted() {
        assert!(Cli::try_parse_from([
            "notegrade",
            "summarize",
            "--results",
            "r.json",
            "--format",
            "xml"
        ])
        .is_err());
    }
}
