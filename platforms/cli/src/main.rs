use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use turing_sim::{
    DefinitionLoader, Event, MachineDefinition, ProgramManager, Simulator, SimulatorConfig,
    TuringMachine, Verdict,
};

/// Runs a single-tape Turing machine and reports its verdict.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turing-sim-cli --example binary-increment --input 101
  turing-sim-cli --program machine.json --input 0110 --speed 200 --debug
  cat machine.json | turing-sim-cli --input 1+11")]
struct Cli {
    /// Machine definition file (JSON). Can also be piped via stdin.
    #[clap(short, long, conflicts_with = "example")]
    program: Option<PathBuf>,

    /// Built-in example, by id or name.
    #[clap(short, long)]
    example: Option<String>,

    /// Input written onto the tape. Defaults to the example's first sample input.
    #[clap(short, long)]
    input: Option<String>,

    /// Milliseconds between steps (interactive front ends use 100-1000). 0 runs flat out.
    #[clap(short, long)]
    speed: Option<u64>,

    /// Give up after this many steps.
    #[clap(long)]
    max_steps: Option<usize>,

    /// Simulator config file (JSON).
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print each step of the execution.
    #[clap(short = 'd', long)]
    debug: bool,

    /// List the built-in examples and exit.
    #[clap(short, long)]
    list: bool,

    /// Log engine activity to stderr.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list {
        list_examples();
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimulatorConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.speed_ms = speed;
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }

    let (definition, sample_input) = load_definition(&cli)?;
    let input = cli.input.or(sample_input).unwrap_or_default();
    let max_steps = config.max_steps;

    let mut sim = Simulator::with_config(definition, config)?;
    sim.load_input(&input)?;

    if cli.debug {
        print_state(sim.machine());
        sim.subscribe(|event| {
            if let Event::Stepped(record) = event {
                match &record.rule {
                    Some(rule) => println!("Step {}: {}", record.step, rule),
                    None => println!(
                        "Step {}: no rule for ({}, {})",
                        record.step, record.state, record.read
                    ),
                }
            }
        });
    }

    drive(&mut sim, max_steps, cli.debug);

    let machine = sim.machine();
    match machine.tape().contents() {
        Some(contents) => println!("\nFinal tape: {}", contents),
        None => println!("\nFinal tape (around head): {}", head_window(machine)),
    }
    println!(
        "Head: {}, State: {}, Steps: {}",
        machine.head(),
        machine.state(),
        machine.step_count()
    );

    Ok(match machine.verdict() {
        Some(Verdict::Accepted) => {
            println!("Verdict: accepted");
            ExitCode::SUCCESS
        }
        Some(Verdict::Rejected) => {
            println!("Verdict: rejected");
            ExitCode::from(2)
        }
        None => {
            println!("Stopped after {} steps without halting", max_steps);
            ExitCode::from(3)
        }
    })
}

/// Plays the machine and sleeps between scheduled steps until it halts or the
/// step budget is spent.
fn drive(sim: &mut Simulator, max_steps: usize, debug: bool) {
    sim.play(Instant::now());

    while let Some(deadline) = sim.next_deadline() {
        if sim.machine().step_count() >= max_steps as u64 {
            sim.pause();
            break;
        }

        let wait = deadline.saturating_duration_since(Instant::now());
        if wait > Duration::ZERO {
            thread::sleep(wait);
        }

        if sim.tick(Instant::now()).is_some() && debug {
            print_state(sim.machine());
        }
    }
}

fn print_state(machine: &TuringMachine) {
    println!(
        "  [{}] state={} head={} steps={}",
        head_window(machine),
        machine.state(),
        machine.head(),
        machine.step_count()
    );
}

fn head_window(machine: &TuringMachine) -> String {
    let head = machine.head();
    machine
        .window(head.saturating_sub(7)..=head.saturating_add(7))
        .into_iter()
        .collect()
}

/// Loads the definition from a file, a built-in example, or stdin, in that order.
/// Returns the definition and, for examples, its default input.
fn load_definition(cli: &Cli) -> Result<(MachineDefinition, Option<String>)> {
    if let Some(path) = &cli.program {
        let definition = DefinitionLoader::load_definition(path)
            .with_context(|| format!("failed to load program {}", path.display()))?;
        return Ok((definition, None));
    }

    if let Some(key) = &cli.example {
        let example = ProgramManager::find(key)?;
        let input = example.default_input().to_string();
        return Ok((example.definition, Some(input)));
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        let definition = DefinitionLoader::load_definition_from_string(&buffer)?;
        return Ok((definition, None));
    }

    bail!("no machine given: use --program, --example, or pipe a definition on stdin")
}

fn list_examples() {
    for index in 0..ProgramManager::count() {
        if let Ok(info) = ProgramManager::get_example_info(index) {
            println!(
                "{:<20} {:<20} {} states, {} rules, samples: {}",
                info.id,
                info.name,
                info.state_count,
                info.transition_count,
                info.sample_inputs.join(" ")
            );
        }
    }
}
