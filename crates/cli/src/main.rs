//! Trace-driven cache simulator CLI.
//!
//! This binary replays a recorded guest instruction stream through the
//! cache model. It performs:
//! 1. **Profiling run:** replay a trace and print the hit/miss report.
//! 2. **Injection run:** additionally corrupt one cache line, with the plan
//!    taken from the configuration JSON or from a fault-injection
//!    supervisor over the framed-token stream protocol.

use clap::{Parser, Subcommand};
use std::net::TcpStream;
use std::path::Path;
use std::{fs, process};

use a9sim_core::sim::{trace, SupervisorLink};
use a9sim_core::{Config, InjectionPlan, SimError, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "a9sim",
    author,
    version,
    about = "ARM Cortex-A9 cache-hierarchy simulator and fault injector",
    long_about = "Replay a guest instruction trace through the Zynq-7000 cache model.\n\n\
Examples:\n  \
a9sim run -t boot.trace --text-begin 0x100000 --text-end 0x140000\n  \
a9sim run -t boot.trace -c zynq.json --host 127.0.0.1 --port 4242 --inject"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace file, optionally injecting a fault.
    Run {
        /// Trace file to replay (I/M/R records).
        #[arg(short, long)]
        trace: String,

        /// Configuration JSON; defaults to the Zynq-7000 hierarchy.
        #[arg(short, long)]
        config: Option<String>,

        /// First address of the guest .text section (hex), overrides config.
        #[arg(long)]
        text_begin: Option<String>,

        /// One past the last .text address (hex), overrides config.
        #[arg(long)]
        text_end: Option<String>,

        /// Supervisor IPv4 address.
        #[arg(long)]
        host: Option<String>,

        /// Supervisor TCP port.
        #[arg(long)]
        port: Option<u16>,

        /// Request an injection plan from the supervisor before replaying.
        #[arg(long)]
        inject: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            trace,
            config,
            text_begin,
            text_end,
            host,
            port,
            inject,
        } => cmd_run(trace, config, text_begin, text_end, host, port, inject),
    }
}

/// Parses an address argument: `0x`-prefixed or bare hex, as the reference
/// tooling passed them.
fn parse_addr(arg: &str) -> u64 {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);
    u64::from_str_radix(digits, 16).unwrap_or_else(|_| {
        eprintln!("Error: {arg:?} is not a hex address");
        process::exit(1);
    })
}

/// Loads the configuration and applies command-line overrides.
fn build_config(
    config_path: Option<String>,
    text_begin: Option<String>,
    text_end: Option<String>,
) -> Config {
    let mut config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading config {path}: {e}");
                process::exit(1);
            });
            Config::from_json(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing config {path}: {e}");
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    if let Some(begin) = text_begin {
        config.general.text_begin = parse_addr(&begin);
    }
    if let Some(end) = text_end {
        config.general.text_end = parse_addr(&end);
    }
    config
}

/// Runs the simulator over a trace, wiring the supervisor when requested.
fn cmd_run(
    trace_path: String,
    config_path: Option<String>,
    text_begin: Option<String>,
    text_end: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    inject: bool,
) {
    let config = build_config(config_path, text_begin, text_end);

    let mut link: Option<SupervisorLink<TcpStream>> = match (host, port) {
        (Some(host), Some(port)) => Some(SupervisorLink::connect(&host, port).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        })),
        (None, None) => None,
        _ => {
            eprintln!("Error: --host and --port must be given together");
            process::exit(1);
        }
    };
    if inject && link.is_none() && config.injection.is_none() {
        eprintln!("Error: --inject needs a supervisor link or an injection plan in the config");
        process::exit(1);
    }

    let mut sim = Simulator::new(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    println!(
        "[*] text: {:#X} - {:#X}  target: {}",
        config.general.text_begin, config.general.text_end, config.general.target
    );

    // a plan from the supervisor supersedes one embedded in the config
    let mut plan: Option<InjectionPlan> = config.injection.clone();
    if inject {
        if let Some(link) = link.as_mut() {
            let received = link.recv_plan().unwrap_or_else(|e| {
                eprintln!("Error receiving injection plan: {e}");
                process::exit(1);
            });
            if let Err(e) = sim.driver().caches().validate_injection(&received) {
                log::error!("injection plan rejected: {e}");
            }
            plan = Some(received);
        }
        if let Some(plan) = plan.clone() {
            sim.arm(plan);
        }
    }

    let events = trace::load_trace(Path::new(&trace_path)).unwrap_or_else(|e| {
        eprintln!("Error loading trace {trace_path}: {e}");
        process::exit(1);
    });

    let mut injected = false;
    for event in &events {
        let Some(outcome) = sim.step(event) else {
            continue;
        };
        injected = true;
        match outcome {
            Ok(event) => {
                println!(
                    "[*] injected at {:#010X} after {} instructions",
                    event.addr, event.insn_count
                );
                if let Some(link) = link.as_mut() {
                    report(link.report_validity(true));
                    report(link.report_fire(&event));
                }
            }
            Err(e) => {
                log::error!("injection failed: {e}");
                if let Some(link) = link.as_mut() {
                    report(link.report_validity(false));
                    // the reference model still reports coordinates relative
                    // to an empty slot
                    if let SimError::InvalidSlot { .. } = e {
                        let fallback = a9sim_core::InjectionEvent {
                            insn_count: sim.driver().counters().insn_count,
                            addr: plan.as_ref().map_or(0, |p| p.word * 4),
                        };
                        report(link.report_fire(&fallback));
                    }
                }
            }
        }
    }

    if !injected {
        if let Some(link) = link.as_mut() {
            report(link.report_final_count(sim.driver().counters().insn_count));
        }
    }

    println!();
    print!("{}", sim.report());
}

/// Logs a supervisor-link failure without aborting the report path.
fn report(result: Result<(), SimError>) {
    if let Err(e) = result {
        log::error!("supervisor report failed: {e}");
    }
}
