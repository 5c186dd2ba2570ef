use clap::Parser;
use std::fs::File;
use std::io::{stderr, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use vessel::prelude::*;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error(transparent)]
    Rule(#[from] RuleParseError),
    #[error(transparent)]
    Registry(#[from] RegistryFull),
    #[error(transparent)]
    StdIo(#[from] std::io::Error),
    #[error("rules were given without any molecules")]
    RulesWithoutMolecules,
    #[error("molecules were given without any rules")]
    MoleculesWithoutRules,
}

/// Simulate a non-constructive reaction vessel and print its concentrations as CSV.
///
/// Without `--molecule`, runs the basic two-molecule vessel: `B + B -> A`, anything else
/// makes a `B`.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// A molecule and its initial amount, as NAME=AMOUNT. Repeatable.
    #[arg(short, long = "molecule", value_parser = parse_amount)]
    molecules: Vec<(String, usize)>,
    /// A reaction rule such as "A + B -> A", in priority order. Repeatable.
    #[arg(short, long = "rule")]
    rules: Vec<String>,
    /// Initial amount of each molecule in the basic vessel.
    #[arg(long, default_value_t = 5000)]
    amount_each: usize,
    /// Number of steps [default: four times the population]
    #[arg(short = 'n', long)]
    steps: Option<u64>,
    /// Molecules drawn per step.
    #[arg(short = 'k', long, default_value_t = 2)]
    sample_size: usize,
    /// Report every this many steps [default: a tenth of the population]
    #[arg(short, long)]
    emit_every: Option<u64>,
    /// Seed for the random generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the CSV here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn parse_amount(s: &str) -> Result<(String, usize), String> {
    let (name, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got {s:?}"))?;
    let amount = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount {amount:?}: {e}"))?;
    Ok((name.trim().to_string(), amount))
}

fn init_tracing() {
    use tracing_subscriber::filter::*;
    use tracing_subscriber::prelude::*;
    let targets = match std::env::var("RUST_LOG") {
        Ok(var) => var.parse::<Targets>().unwrap_or_else(|e| {
            eprintln!("Ignoring `RUST_LOG={var:?}`: {e}");
            Targets::new().with_default(tracing::Level::ERROR)
        }),
        Err(e) => {
            if e != std::env::VarError::NotPresent {
                eprintln!("Ignoring `RUST_LOG`: {e}");
            }
            Targets::new().with_default(tracing::Level::ERROR)
        }
    };
    let fmt = tracing_subscriber::fmt::layer().with_writer(stderr);
    tracing_subscriber::registry()
        .with(targets)
        .with(fmt)
        .init();
}

fn build_scenario(cli: &Cli) -> Result<Scenario, CliError> {
    match (cli.molecules.is_empty(), cli.rules.is_empty()) {
        (true, true) => return Ok(Scenario::basic(cli.amount_each)),
        (true, false) => return Err(CliError::RulesWithoutMolecules),
        (false, true) => return Err(CliError::MoleculesWithoutRules),
        (false, false) => {}
    }
    let mut registry = Registry::new();
    let mut amounts = Vec::with_capacity(cli.molecules.len());
    for (name, amount) in &cli.molecules {
        amounts.push((registry.declare(name.as_str())?, *amount));
    }
    let rules = RuleTable::parse(&registry, cli.rules.iter().map(String::as_str))?;
    Ok(Scenario {
        registry,
        amounts,
        rules,
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    let scenario = build_scenario(&cli)?;
    let mut config = scenario.default_config().with_sample_size(cli.sample_size);
    if let Some(steps) = cli.steps {
        config = config.with_total_steps(steps);
    }
    if let Some(every) = cli.emit_every {
        config = config.with_emit_every(every);
    }
    for rule in &scenario.rules {
        tracing::debug!("rule: {}", rule.display(&scenario.registry));
    }
    let mut vessel = scenario.into_seeded(cli.seed)?;
    let out: Box<dyn Write> = match &cli.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    };
    let mut writer = CsvWriter::new(out, vessel.registry());
    let last = vessel.run(config, &mut writer)?;
    if let Some(err) = writer.take_error() {
        return Err(err.into());
    }
    writer.into_inner()?;
    for (ty, pct) in last.iter() {
        let name = vessel.registry().name(ty).unwrap_or("?");
        tracing::info!("{name}: {pct:.2}%");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
