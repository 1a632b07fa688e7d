//! MPU - memristive gate simulator
//! Command-line front end over a simulation session

mod render;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use mpu_gates::{ComparisonTable, GateCatalog};
use mpu_logic::{Coord, StepOutcome};
use mpu_orchestration::{Scheduler, SchedulerConfig, Session, SimConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mpu")]
#[command(author = "MPU Contributors")]
#[command(version = "2026.10.16")]
#[command(about = "MPU - memristor crossbar logic gate simulator", long_about = None)]
struct Cli {
    /// Configuration file (TOML); MPU_* variables override it
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the gate catalog
    Gates,

    /// Replay a gate's instruction sequence step by step
    Run {
        /// Gate name (case-insensitive)
        #[arg(value_name = "GATE")]
        gate: String,

        /// Input A
        #[arg(short, action = ArgAction::Set, value_parser = parse_bit, default_value = "0")]
        a: bool,

        /// Input B (ignored by single-input gates)
        #[arg(short, action = ArgAction::Set, value_parser = parse_bit, default_value = "0")]
        b: bool,

        /// Pause between instructions; overrides step_delay_ms
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Print the final derived state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Truth table with interpreter and crossbar readout side by side
    Truth {
        #[arg(value_name = "GATE")]
        gate: String,
    },

    /// Drive the crossbar with A/B and show currents and readout
    Crossbar {
        #[arg(short, action = ArgAction::Set, value_parser = parse_bit, default_value = "0")]
        a: bool,

        #[arg(short, action = ArgAction::Set, value_parser = parse_bit, default_value = "0")]
        b: bool,

        /// Drive voltage in volts
        #[arg(long, value_name = "V")]
        voltage: Option<f64>,

        /// Disable the selector of a cell (repeatable)
        #[arg(long, value_name = "ROW,COL", value_parser = parse_coord)]
        deselect: Vec<Coord>,

        /// Put a cell in the low-resistance state (repeatable)
        #[arg(long, value_name = "ROW,COL", value_parser = parse_coord)]
        low: Vec<Coord>,

        /// Print the derived state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = dispatch(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,mpu_orchestration=info,mpu_gates=info",
        _ => "info,mpu_orchestration=debug,mpu_logic=debug,mpu_crossbar=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Gates => gates_command(),
        Commands::Run {
            gate,
            a,
            b,
            delay_ms,
            json,
        } => run_command(config, &gate, a, b, delay_ms, json),
        Commands::Truth { gate } => truth_command(config, &gate),
        Commands::Crossbar {
            a,
            b,
            voltage,
            deselect,
            low,
            json,
        } => crossbar_command(config, a, b, voltage, &deselect, &low, json),
        Commands::Config => config_command(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let config = SimConfig::load(path).with_context(|| match path {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "loading configuration from environment".to_string(),
    })?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

// ============================================================================
// Commands
// ============================================================================

fn gates_command() -> Result<()> {
    let catalog = GateCatalog::builtin();
    let comparison = ComparisonTable::builtin()?;

    println!("{}", "Gate catalog".bold());
    println!();
    for gate in catalog.iter() {
        let (rows, cols) = gate.dimensions();
        println!(
            "  {:<5} {} input{}  {}x{} grid  out {}  {}",
            gate.name().cyan().bold(),
            gate.arity(),
            if gate.arity() == 1 { " " } else { "s" },
            rows,
            cols,
            gate.output_cell(),
            gate.description().dimmed()
        );
        if let Some(figures) = comparison.get(gate.name()) {
            println!(
                "        CMOS {} T / {:.1} fJ / {} cycle(s)   mMPU {} devices / {:.1} fJ / {} cycles",
                figures.cmos_transistors,
                figures.cmos_energy_fj,
                figures.cmos_cycles,
                figures.mpu_devices,
                figures.mpu_energy_fj,
                figures.mpu_cycles
            );
        }
    }
    Ok(())
}

fn run_command(
    config: SimConfig,
    gate: &str,
    a: bool,
    b: bool,
    delay_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let delay = delay_ms.unwrap_or(config.step_delay_ms);
    let mut session = Session::new(config)?;
    session.select_gate(gate)?;
    session.set_inputs(a, b)?;

    let mut scheduler = Scheduler::new(SchedulerConfig::from_delay_ms(delay));
    let handle = session.start_run()?;

    if !json {
        let state = session.derive_state();
        println!(
            "{} {} with A={} B={}",
            "Running".green().bold(),
            state.gate.name.cyan(),
            render::bit(a),
            render::bit(b)
        );
        println!();
        print!("{}", render::render_instruction_log(&state.instructions, None));
        println!();
        print!("{}", render::render_grid(&state.snapshot));
    }

    while session.is_running() {
        scheduler.wait_for_next_tick();
        let started = Instant::now();
        let outcome = session.tick(handle)?;
        scheduler.record_step_time(started.elapsed());

        let StepOutcome::Applied { step, .. } = outcome else {
            break;
        };
        if !json {
            let state = session.derive_state();
            println!();
            println!("{}", format!("step {}", step).yellow().bold());
            print!("{}", render::render_step(&state));
        }
    }

    let state = session.derive_state();
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let Some(run) = state.last_run.as_ref() else {
        bail!("run did not complete ({:?})", state.replay);
    };
    println!();
    println!("{}", "Result".bold());
    println!("  reference   {}", render::bit(run.output).to_string().green().bold());
    let interpreted = render::bit(run.interpreted).to_string();
    if run.interpreter_agrees() {
        println!("  interpreted {}", interpreted);
    } else {
        println!("  interpreted {} {}", interpreted.red(), "(differs)".red());
    }
    println!("  electrical  {}", electrical_label(state.electrical_output, state.agreement));
    println!();
    print!("{}", render::render_crossbar(&state.crossbar, &state.simulation.currents));
    print!("{}", render::render_readout(&state.simulation));

    let stats = scheduler.stats();
    tracing::info!(
        ticks = stats.tick_count,
        avg_step_us = stats.avg_step_time.as_micros() as u64,
        "replay finished"
    );
    Ok(())
}

fn truth_command(config: SimConfig, gate: &str) -> Result<()> {
    let mut session = Session::new(SimConfig {
        step_delay_ms: 0,
        ..config
    })?;
    session.select_gate(gate)?;
    let definition = session.gate().clone();
    let mut scheduler = Scheduler::best_effort();

    println!("{} {}", "Truth table".bold(), definition.name().cyan().bold());
    println!();
    if definition.arity() >= 2 {
        println!("  A B | ref interp elec");
    } else {
        println!("  A | ref interp elec");
    }

    for (inputs, _) in definition.truth_table() {
        session.set_inputs(inputs.a, inputs.b)?;
        let run = session.run_to_completion(&mut scheduler)?;
        let state = session.derive_state();

        let columns = if definition.arity() >= 2 {
            format!("{} {}", render::bit(inputs.a), render::bit(inputs.b))
        } else {
            render::bit(inputs.a).to_string()
        };
        let interpreted = if run.interpreter_agrees() {
            render::bit(run.interpreted).to_string().normal()
        } else {
            render::bit(run.interpreted).to_string().red()
        };
        println!(
            "  {} |  {}    {}     {}",
            columns,
            render::bit(run.output).to_string().bold(),
            interpreted,
            electrical_label(state.electrical_output, state.agreement)
        );
    }
    Ok(())
}

fn crossbar_command(
    config: SimConfig,
    a: bool,
    b: bool,
    voltage: Option<f64>,
    deselect: &[Coord],
    low: &[Coord],
    json: bool,
) -> Result<()> {
    let mut session = Session::new(SimConfig {
        mirror_logic_to_crossbar: false,
        ..config
    })?;
    session.set_inputs(a, b)?;
    if let Some(volts) = voltage {
        session.set_drive_voltage(volts)?;
    }
    for coord in low {
        session
            .toggle_crossbar_resistance(coord.row, coord.col)
            .with_context(|| format!("--low {}", coord))?;
    }
    for coord in deselect {
        session
            .toggle_crossbar_selector(coord.row, coord.col)
            .with_context(|| format!("--deselect {}", coord))?;
    }

    let state = session.derive_state();
    if json {
        println!("{}", serde_json::to_string_pretty(&state.simulation)?);
        return Ok(());
    }

    println!(
        "{} A={} → WL0, B={} → WL1",
        "Crossbar".bold(),
        render::bit(a),
        render::bit(b)
    );
    println!();
    print!("{}", render::render_crossbar(&state.crossbar, &state.simulation.currents));
    print!("{}", render::render_readout(&state.simulation));
    Ok(())
}

fn config_command(config: &SimConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn electrical_label(output: bool, agreement: bool) -> ColoredString {
    let text = render::bit(output).to_string();
    if agreement { text.green() } else { text.yellow() }
}

// ============================================================================
// Argument parsing
// ============================================================================

fn parse_bit(raw: &str) -> std::result::Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        other => Err(format!("expected 0 or 1, got '{}'", other)),
    }
}

fn parse_coord(raw: &str) -> std::result::Result<Coord, String> {
    let (row, col) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{}'", raw))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid index '{}': {}", part.trim(), e))
    };
    Ok(Coord::new(parse(row)?, parse(col)?))
}
