//! `accesslint-sim`: run fixture stories through the full audit pipeline

use accesslint_harness::{run_simulator, SimulatorReport};
use accesslint_preview::AuditConfig;
use accesslint_test_utils::SessionFixture;
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AuditConfig> {
    match path {
        Some(path) => AuditConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let default = PathBuf::from("accesslint.toml");
            if default.exists() {
                AuditConfig::load(&default).context("loading accesslint.toml")
            } else {
                Ok(AuditConfig::default())
            }
        }
    }
}

fn load_fixture(path: &Path) -> anyhow::Result<SessionFixture> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    let fixture = SessionFixture::from_json(&raw)
        .with_context(|| format!("parsing fixture {}", path.display()))?;
    fixture
        .document()
        .with_context(|| format!("building document from fixture {}", path.display()))?;
    Ok(fixture)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Command::new("accesslint-sim")
        .version(accesslint_core::VERSION)
        .about("AccessLint audit pipeline simulator")
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("simulate")
                .about("Audit every story in a fixture as one test run")
                .arg(
                    Arg::new("fixture")
                        .long("fixture")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Session fixture (JSON)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Audit configuration (TOML); defaults to ./accesslint.toml"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the resolved audit configuration")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Audit configuration (TOML); defaults to ./accesslint.toml"),
                ),
        );

    let matches = cli.get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("simulate", args)) => {
            let fixture_path = args
                .get_one::<PathBuf>("fixture")
                .context("--fixture is required")?;
            let fixture = load_fixture(fixture_path)?;
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            tracing::info!(
                stories = fixture.stories.len(),
                chunked = config.chunked,
                "simulating"
            );

            let report: SimulatorReport = run_simulator(&fixture, config)
                .await
                .context("running simulator")?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.generate_text());
            }
            std::process::exit(if report.passed() { 0 } else { 1 });
        }
        Some(("config", args)) => {
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            print!("{}", config.to_toml_string()?);
        }
        _ => {}
    }
    Ok(())
}
