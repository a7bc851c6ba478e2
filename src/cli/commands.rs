use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Detects a project's language stack and generates a container execution plan
#[derive(Parser, Debug)]
#[command(
    name = "stackplan",
    about = "Detect a project's language stack and generate a container execution plan",
    version,
    author,
    long_about = "stackplan inspects a source tree with a set of per-language providers \
                  (node, python, java, go, php, ruby, rust, deno, staticfile, shell), \
                  ranks and merges their detections, and produces an execution plan \
                  describing the base image, system packages and commands needed to \
                  build and run the project in a container."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect languages and frameworks in a project",
        long_about = "Runs every registered provider (or a single one with --provider) \
                      against the project's files and prints the filtered, merged results \
                      with summary statistics.\n\n\
                      Examples:\n  \
                      stackplan detect\n  \
                      stackplan detect /path/to/project\n  \
                      stackplan detect --provider node --format json\n  \
                      stackplan detect --min-confidence 0.8 --parallel"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Generate an execution plan for a project",
        long_about = "Detects the project and turns the strongest result into an execution \
                      plan: base image, system packages, commands and environment.\n\n\
                      Examples:\n  \
                      stackplan plan\n  \
                      stackplan plan /path/to/project --format yaml\n  \
                      stackplan plan --offline --platform linux/arm64\n  \
                      stackplan plan --base ubuntu:24.04"
    )]
    Plan(PlanArgs),

    #[command(
        about = "List registered providers",
        long_about = "Lists every provider with its language tag and priority, in the order \
                      a full scan runs them.\n\n\
                      Examples:\n  \
                      stackplan providers\n  \
                      stackplan providers --format json"
    )]
    Providers(ProvidersArgs),
}

/// Options shared by commands that scan and detect a project
#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to project (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(short = 'p', long, value_name = "NAME", help = "Run only this provider")]
    pub provider: Option<String>,

    #[arg(
        long,
        value_name = "N",
        help = "Maximum directory depth to scan [env: STACKPLAN_MAX_DEPTH]"
    )]
    pub max_depth: Option<usize>,

    #[arg(
        long,
        value_name = "N",
        help = "Maximum number of files to scan [env: STACKPLAN_MAX_FILES]"
    )]
    pub max_files: Option<usize>,

    #[arg(
        long,
        value_name = "SCORE",
        value_parser = parse_confidence,
        help = "Minimum confidence to keep a detection, 0 for the default 0.5 [env: STACKPLAN_MIN_CONFIDENCE]"
    )]
    pub min_confidence: Option<f64>,

    #[arg(long, help = "Run providers in parallel [env: STACKPLAN_PARALLEL]")]
    pub parallel: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    #[arg(long, help = "Prefer offline install commands")]
    pub offline: bool,

    #[arg(long, value_name = "PLATFORM", help = "Target platform, e.g. linux/amd64")]
    pub platform: Option<String>,

    #[arg(long, value_name = "IMAGE", help = "Override the base image")]
    pub base: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ProvidersArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_confidence(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid confidence: {}. Expected a number between 0 and 1", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("Confidence must be between 0 and 1, got {}", value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["stackplan", "detect"]);
        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.format, OutputFormatArg::Human);
                assert!(detect_args.scan.project_path.is_none());
                assert!(detect_args.scan.provider.is_none());
                assert!(detect_args.scan.min_confidence.is_none());
                assert!(!detect_args.scan.parallel);
                assert!(detect_args.output.is_none());
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_detect_with_options() {
        let args = CliArgs::parse_from([
            "stackplan",
            "detect",
            "/tmp/project",
            "--provider",
            "node",
            "--min-confidence",
            "0.8",
            "--max-depth",
            "3",
            "--max-files",
            "200",
            "--parallel",
            "--format",
            "json",
        ]);

        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(
                    detect_args.scan.project_path,
                    Some(PathBuf::from("/tmp/project"))
                );
                assert_eq!(detect_args.scan.provider.as_deref(), Some("node"));
                assert_eq!(detect_args.scan.min_confidence, Some(0.8));
                assert_eq!(detect_args.scan.max_depth, Some(3));
                assert_eq!(detect_args.scan.max_files, Some(200));
                assert!(detect_args.scan.parallel);
                assert_eq!(detect_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_min_confidence_out_of_range() {
        let result = CliArgs::try_parse_from(["stackplan", "detect", "--min-confidence", "1.5"]);
        assert!(result.is_err());
        assert!(parse_confidence("abc").is_err());
        assert_eq!(parse_confidence("0"), Ok(0.0));
    }

    #[test]
    fn test_plan_command() {
        let args = CliArgs::parse_from([
            "stackplan",
            "plan",
            "--offline",
            "--platform",
            "linux/arm64",
            "--base",
            "ubuntu:24.04",
            "-f",
            "yaml",
        ]);
        match args.command {
            Commands::Plan(plan_args) => {
                assert!(plan_args.offline);
                assert_eq!(plan_args.platform.as_deref(), Some("linux/arm64"));
                assert_eq!(plan_args.base.as_deref(), Some("ubuntu:24.04"));
                assert_eq!(plan_args.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_providers_command() {
        let args = CliArgs::parse_from(["stackplan", "providers", "--format", "json"]);
        match args.command {
            Commands::Providers(providers_args) => {
                assert_eq!(providers_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Providers command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["stackplan", "-v", "detect"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["stackplan", "detect", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["stackplan", "--log-level", "debug", "providers"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));

        assert!(CliArgs::try_parse_from(["stackplan", "-v", "-q", "detect"]).is_err());
    }
}
