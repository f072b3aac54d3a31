use anyhow::Context as _;
use appctx_services::{AppConfig, AppContext, KNOWN_SERVICES};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod report;

use report::Report;

fn config_args() -> [Arg; 2] {
    [
        Arg::new("config")
            .long("config")
            .short('c')
            .value_parser(value_parser!(PathBuf))
            .help("TOML config file"),
        Arg::new("experiment")
            .long("experiment")
            .short('e')
            .action(ArgAction::Append)
            .help("Enable an experiment (repeatable)"),
    ]
}

fn cli() -> Command {
    Command::new("appctx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect the lazily initialized application context")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("inspect")
                .about("Boot the context, touch services, and print their states")
                .args(config_args())
                .arg(
                    Arg::new("touch")
                        .long("touch")
                        .short('t')
                        .action(ArgAction::Append)
                        .help("Look up a service before reporting (repeatable)"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Look up every known service"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("flags")
                .about("Print the enabled experiments")
                .args(config_args()),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration as TOML")
                .args(config_args()),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file, then environment, then command-line experiments
fn load_config(args: &ArgMatches) -> anyhow::Result<AppConfig> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::new(),
    };
    let config = config.with_env();

    Ok(match args.get_many::<String>("experiment") {
        Some(experiments) => config.with_experiments(experiments),
        None => config,
    })
}

/// Boot a context, look up the requested services, and snapshot the result
fn build_report(args: &ArgMatches) -> anyhow::Result<Report> {
    let context = AppContext::new(load_config(args)?)?;
    let registry = context.registry();

    let mut touch: Vec<String> = args
        .get_many::<String>("touch")
        .map(|names| names.cloned().collect())
        .unwrap_or_default();
    if args.get_flag("all") {
        touch.extend(KNOWN_SERVICES.iter().map(ToString::to_string));
    }

    let mut errors = BTreeMap::new();
    for name in &touch {
        if let Err(err) = registry.get(name) {
            tracing::warn!(service = %name, error = %err, "lookup failed");
            errors.insert(name.clone(), err.to_string());
        }
    }

    Ok(Report::collect(registry, &errors))
}

fn inspect(args: &ArgMatches) -> anyhow::Result<()> {
    let report = build_report(args)?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn flags(args: &ArgMatches) -> anyhow::Result<()> {
    let context = AppContext::new(load_config(args)?)?;
    let flags = context.flags_service()?;

    if flags.is_empty() {
        println!("No experiments enabled");
    }
    for experiment in flags.enabled_experiments() {
        println!("{experiment}");
    }
    Ok(())
}

fn print_config(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing();

    match matches.subcommand() {
        Some(("inspect", args)) => inspect(args),
        Some(("flags", args)) => flags(args),
        Some(("config", args)) => print_config(args),
        _ => Ok(()),
    }
}
