//! apidispatch CLI - validate API documents and list the routes they define

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use apidispatch_core::{
    Config, Dialect, Finding, FindingKind, Report, Severity, ValidationResult, VerdictPolicy,
    collect_findings,
};
use apidispatch_validator::{AddApiOutcome, Dispatcher, load};

const CONFIG_FILE: &str = ".apidispatch.toml";

#[derive(Parser)]
#[command(name = "apidispatch")]
#[command(about = "Validate Swagger/OpenAPI documents and list their routes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Config file (default: .apidispatch.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Strict mode (unresolved handlers fail). Use --strict false to disable.
    #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
    strict: bool,

    /// Finding kinds to ignore, added to `ignore` from config (e.g. unresolved_handler)
    #[arg(long, global = true, value_delimiter = ',')]
    ignore: Vec<FindingKind>,

    /// Verbose output (debug logs)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against its dialect grammar and its references
    Validate {
        /// Document path (default: `spec` from config)
        spec: Option<PathBuf>,
    },

    /// Validate documents and print the routes they define.
    /// With `--output json`, prints one report per document.
    Routes {
        /// Document paths, added in order (default: `spec` from config)
        specs: Vec<PathBuf>,
    },

    /// Print the dialect of a document
    Detect {
        /// Document path (default: `spec` from config)
        spec: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_default()?,
    };
    Ok(cfg)
}

/// Strictness from the command line; ignored kinds from both config and flags.
fn verdict_policy(cli: &Cli, cfg: &Config) -> VerdictPolicy {
    let mut ignore_kinds = cfg.ignore.clone();
    for kind in &cli.ignore {
        if !ignore_kinds.contains(kind) {
            ignore_kinds.push(*kind);
        }
    }
    VerdictPolicy {
        strict: cli.strict,
        ignore_kinds,
    }
}

/// Documents named on the command line, or the configured default.
fn documents(given: Vec<PathBuf>, cfg: &Config) -> Result<Vec<PathBuf>> {
    if !given.is_empty() {
        return Ok(given);
    }
    match &cfg.spec {
        Some(spec) => Ok(vec![spec.clone()]),
        None => bail!("No document given and no `spec` in {CONFIG_FILE}"),
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Validate { ref spec } => {
            let cfg = load_config(cli.config.as_deref())?;
            let policy = verdict_policy(&cli, &cfg);
            let path = documents(spec.iter().cloned().collect(), &cfg)?.remove(0);
            let dispatcher = Dispatcher::from_config(&cfg);

            let doc = load(path.as_path())?;
            let validation = dispatcher.validator().validate(&doc)?;
            let findings = policy.filter(collect_findings(&validation, None));
            let verdict = policy.verdict(&findings);

            match cli.output {
                OutputFormat::Terminal => {
                    println!("{}", validation.to_terminal());
                    println!("\n{}: {}", verdict.status, verdict.reason);
                }
                OutputFormat::Json => {
                    let report = Report {
                        source: path.display().to_string(),
                        validation,
                        routes: None,
                        findings,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(verdict.exit_code)
        }

        Commands::Routes { ref specs } => {
            let cfg = load_config(cli.config.as_deref())?;
            let policy = verdict_policy(&cli, &cfg);
            let paths = documents(specs.clone(), &cfg)?;
            let mut dispatcher = Dispatcher::from_config(&cfg);

            let mut reports = Vec::new();
            for path in &paths {
                let outcome = dispatcher
                    .add_api(path.as_path())
                    .with_context(|| format!("Failed to add {}", path.display()))?;
                let (validation, routes) = match outcome {
                    AddApiOutcome::Added { dialect, routes, .. } => (
                        ValidationResult::from_checks(dialect, vec![], vec![]),
                        Some(routes),
                    ),
                    AddApiOutcome::Rejected { stage, result } => {
                        if cli.output == OutputFormat::Terminal {
                            eprintln!("Rejected {} (halted after {stage})", path.display());
                            eprintln!("{}", result.to_terminal());
                        }
                        (result, None)
                    }
                };
                let findings = policy.filter(collect_findings(&validation, routes.as_ref()));
                reports.push(Report {
                    source: path.display().to_string(),
                    validation,
                    routes,
                    findings,
                });
            }

            let findings: Vec<Finding> = reports
                .iter()
                .flat_map(|r| r.findings.iter().cloned())
                .collect();
            let verdict = policy.verdict(&findings);

            match cli.output {
                OutputFormat::Terminal => {
                    println!("{}", dispatcher.routes().to_terminal());
                    println!("\n{}: {}", verdict.status, verdict.reason);
                    for f in findings.iter().filter(|f| f.severity < Severity::Error) {
                        println!("  [{}] {}: {}", f.severity, f.kind, f.message);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(verdict.exit_code)
        }

        Commands::Detect { ref spec } => {
            let cfg = load_config(cli.config.as_deref())?;
            let path = documents(spec.iter().cloned().collect(), &cfg)?.remove(0);
            let doc = load(path.as_path())?;
            let dialect = Dialect::detect(&doc);
            let version = dialect.and_then(|d| d.declared_version(&doc));

            match cli.output {
                OutputFormat::Terminal => match dialect {
                    Some(d) => println!("{d} (declared {})", version.as_deref().unwrap_or("?")),
                    None => println!("unknown: no openapi, swagger or swaggerVersion key"),
                },
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "source": path.display().to_string(),
                        "dialect": dialect,
                        "version": version,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(if dialect.is_some() { 0 } else { 1 })
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, Config::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - spec: default document to validate");
            println!("  - methods_module: default handler module");
            println!("  - handlers: known handler names per module");
            Ok(0)
        }

        Commands::Schema => {
            let schema = apidispatch_core::report::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "apidispatch",
            "routes",
            "a.yaml",
            "b.json",
            "--output",
            "json",
            "--strict",
            "false",
        ])
        .unwrap();
        assert!(!cli.strict);
        assert!(cli.output == OutputFormat::Json);
        let Commands::Routes { specs } = cli.command else {
            panic!("expected routes");
        };
        assert_eq!(specs, vec![PathBuf::from("a.yaml"), PathBuf::from("b.json")]);
    }

    #[test]
    fn strict_by_default() {
        let cli = Cli::try_parse_from(["apidispatch", "validate", "a.yaml"]).unwrap();
        assert!(cli.strict);
        assert!(cli.output == OutputFormat::Terminal);
    }

    #[test]
    fn documents_fall_back_to_config() {
        let mut cfg = Config::default();
        assert!(documents(vec![], &cfg).is_err());
        cfg.spec = Some(PathBuf::from("openapi.yaml"));
        assert_eq!(documents(vec![], &cfg).unwrap(), vec![PathBuf::from("openapi.yaml")]);
        assert_eq!(
            documents(vec![PathBuf::from("x.json")], &cfg).unwrap(),
            vec![PathBuf::from("x.json")]
        );
    }

    #[test]
    fn validate_fixture_exit_codes() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../apidispatch-validator/tests/fixtures");
        let run_validate = |name: &str| {
            let args: Vec<OsString> = vec![
                "apidispatch".into(),
                "--output".into(),
                "silent".into(),
                "validate".into(),
                fixtures.join(name).into_os_string(),
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            run(cli).unwrap()
        };
        assert_eq!(run_validate("petstore-v3.0.json"), 0);
        assert_eq!(run_validate("invalid/broken-ref-v3.0.yaml"), 1);
        assert_eq!(run_validate("invalid/no-version.yaml"), 1);
    }

    #[test]
    fn routes_strict_flags_unresolved_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let spec = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../apidispatch-validator/tests/fixtures/petstore-v3.0.json");
        let config = dir.path().join("apidispatch.json");
        std::fs::write(&config, "{}").unwrap();

        let run_routes = |strict: &str| {
            let args: Vec<OsString> = vec![
                "apidispatch".into(),
                "--output".into(),
                "silent".into(),
                "--config".into(),
                config.clone().into_os_string(),
                "--strict".into(),
                strict.into(),
                "routes".into(),
                spec.clone().into_os_string(),
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            run(cli).unwrap()
        };
        assert_eq!(run_routes("true"), 1);
        assert_eq!(run_routes("false"), 0);
    }

    #[test]
    fn ignored_kinds_come_from_config_and_flags() {
        let cli = Cli::try_parse_from([
            "apidispatch",
            "validate",
            "--ignore",
            "unresolved_handler,broken_reference",
        ])
        .unwrap();
        let cfg = Config {
            ignore: vec![FindingKind::UnresolvedHandler, FindingKind::SchemaViolation],
            ..Config::default()
        };
        let policy = verdict_policy(&cli, &cfg);
        assert_eq!(
            policy.ignore_kinds,
            vec![
                FindingKind::UnresolvedHandler,
                FindingKind::SchemaViolation,
                FindingKind::BrokenReference
            ]
        );
        assert!(Cli::try_parse_from(["apidispatch", "validate", "--ignore", "all"]).is_err());
    }

    #[test]
    fn ignored_unresolved_handlers_pass_strict_routes() {
        let dir = tempfile::tempdir().unwrap();
        let spec = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../apidispatch-validator/tests/fixtures/petstore-v3.0.json");
        let config = dir.path().join("apidispatch.toml");
        std::fs::write(&config, "ignore = [\"unresolved_handler\"]").unwrap();

        let args: Vec<OsString> = vec![
            "apidispatch".into(),
            "--output".into(),
            "silent".into(),
            "--config".into(),
            config.into_os_string(),
            "routes".into(),
            spec.into_os_string(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(run(cli).unwrap(), 0);
    }

    #[test]
    fn missing_document_is_tool_error() {
        let cli = Cli::try_parse_from(["apidispatch", "validate", "does/not/exist.yaml"]).unwrap();
        assert!(run(cli).is_err());
    }
}
