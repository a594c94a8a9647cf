// Purpose: Provides the command-line interface for running and inspecting epidemic scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{info, warn};

use epidemic_simulation::{
    compare_models, load_scenario, parameter_descriptions, preset, sensitivity, simulate_concurrent,
    simulate_with, validate, CancellationFlag, Disease, EngineConfig, ScenarioParameters,
    SimulationError, SimulationResult, SweepParameter,
};

/// Epidemic scenario simulator
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[clap(long, env = "EPI_SIM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and run a scenario
    Run(RunArgs),

    /// Validate a scenario without running it
    Validate(ScenarioArg),

    /// Print the parameters of a built-in disease preset
    Preset(PresetArgs),

    /// Sweep one parameter over a list of values
    Sensitivity(SensitivityArgs),

    /// Run a scenario as SEIR and as SIR and compare the outcomes
    Compare(CompareArgs),

    /// Describe every scenario parameter
    Describe,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scenario file path (.toml, .json, .yaml)
    #[clap(required = true)]
    scenario_path: PathBuf,

    /// Override the number of replications
    #[clap(long)]
    reps: Option<i64>,

    /// Override the random seed
    #[clap(long)]
    seed: Option<u64>,

    /// Write the report to a file instead of stdout
    #[clap(long, short = 'o')]
    output: Option<PathBuf>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ScenarioArg {
    /// Scenario file path (.toml, .json, .yaml)
    #[clap(required = true)]
    scenario_path: PathBuf,
}

#[derive(Args, Debug)]
struct PresetArgs {
    /// Disease name: COVID, Flu or RSV
    #[clap(required = true)]
    disease: String,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Toml)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct SensitivityArgs {
    /// Scenario file path (.toml, .json, .yaml)
    #[clap(required = true)]
    scenario_path: PathBuf,

    /// Parameter to sweep, e.g. beta or vaccination_coverage
    #[clap(long, short = 'p')]
    parameter: String,

    /// Comma-separated values to try
    #[clap(long, value_delimiter = ',', required = true)]
    values: Vec<f64>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Scenario file path (.toml, .json, .yaml)
    #[clap(required = true)]
    scenario_path: PathBuf,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Pretty,
    /// Compact JSON
    Compact,
    /// YAML format
    Yaml,
    /// TOML format
    Toml,
}

/// Result of a `run`, stamped with the time it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub result: SimulationResult,
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Run(args) => run_scenario(&config, args).await,
        Command::Validate(args) => validate_scenario(args),
        Command::Preset(args) => show_preset(args),
        Command::Sensitivity(args) => run_sensitivity(args),
        Command::Compare(args) => run_comparison(args),
        Command::Describe => describe(),
    }
}

fn read_scenario(path: &Path) -> Result<ScenarioParameters> {
    load_scenario(path).with_context(|| format!("Failed to load scenario: {}", path.display()))
}

/// Serialize `value` in the requested format
fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Toml => toml::to_string(value)?,
    })
}

/// Print validation findings to stderr
fn report_findings(error: &SimulationError) {
    if let Some(report) = error.validation() {
        for finding in &report.errors {
            eprintln!("error: {}", finding);
        }
        for finding in &report.warnings {
            eprintln!("warning: {}", finding);
        }
    }
}

/// Run a scenario and print or write the report
async fn run_scenario(config: &EngineConfig, args: RunArgs) -> Result<()> {
    let mut params = read_scenario(&args.scenario_path)?;
    if let Some(reps) = args.reps {
        params.n_reps = reps;
    }
    if let Some(seed) = args.seed {
        params.random_seed = Some(seed);
    }
    info!("Running scenario: {}", args.scenario_path.display());

    let cancel = CancellationFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, stopping after the current replication");
        handler_flag.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    let outcome = if config.parallel {
        simulate_concurrent(&params, config, cancel).await
    } else {
        let config = config.clone();
        task::spawn_blocking(move || simulate_with(&params, &config, &cancel))
            .await
            .context("Simulation task failed")?
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            report_findings(&e);
            return Err(e.into());
        }
    };

    let report = RunReport {
        generated_at: Utc::now(),
        result,
    };
    let rendered = render(&report, args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Validate a scenario and print the findings
fn validate_scenario(args: ScenarioArg) -> Result<()> {
    let params = read_scenario(&args.scenario_path)?;
    let report = validate(&params);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.valid {
        Ok(())
    } else {
        Err(anyhow!(
            "Scenario {} is invalid ({} error(s))",
            args.scenario_path.display(),
            report.errors.len()
        ))
    }
}

/// Print a disease preset
fn show_preset(args: PresetArgs) -> Result<()> {
    let disease: Disease = args.disease.parse()?;
    println!("{}", render(&preset(disease), args.format)?);
    Ok(())
}

/// Sweep one parameter of a scenario
fn run_sensitivity(args: SensitivityArgs) -> Result<()> {
    let params = read_scenario(&args.scenario_path)?;
    let parameter: SweepParameter = args.parameter.parse()?;
    let report = sensitivity(&params, parameter, &args.values).map_err(|e| {
        report_findings(&e);
        e
    })?;
    println!("{}", render(&report, args.format)?);
    Ok(())
}

/// Compare SEIR and SIR runs of a scenario
fn run_comparison(args: CompareArgs) -> Result<()> {
    let params = read_scenario(&args.scenario_path)?;
    let comparison = compare_models(&params).map_err(|e| {
        report_findings(&e);
        e
    })?;
    println!("{}", render(&comparison, args.format)?);
    Ok(())
}

/// Print the parameter descriptions
fn describe() -> Result<()> {
    let width = parameter_descriptions()
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);
    for (name, description) in parameter_descriptions() {
        println!("{:width$}  {}", name, description, width = width);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "epidemic-sim",
            "run",
            "scenario.toml",
            "--reps",
            "3",
            "--seed",
            "9",
            "--format",
            "yaml",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.reps, Some(3));
                assert_eq!(args.seed, Some(9));
                assert_eq!(args.format, OutputFormat::Yaml);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_sensitivity_values() {
        let cli = Cli::try_parse_from([
            "epidemic-sim",
            "sensitivity",
            "s.json",
            "--parameter",
            "beta",
            "--values",
            "0.1,0.2,0.3",
        ])
        .unwrap();
        match cli.command {
            Command::Sensitivity(args) => assert_eq!(args.values, vec![0.1, 0.2, 0.3]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_render_formats() {
        let params = preset(Disease::Flu);
        let json = render(&params, OutputFormat::Compact).unwrap();
        assert!(json.contains("\"disease_name\":\"Flu\""));
        let yaml = render(&params, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("disease_name: Flu"));
        let toml = render(&params, OutputFormat::Toml).unwrap();
        let back: ScenarioParameters = toml::from_str(&toml).unwrap();
        assert_eq!(back, params);
    }
}
