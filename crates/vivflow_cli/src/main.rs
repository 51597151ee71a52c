//! vivflow: drives Vivado from a directory of Verilog sources.
//!
//! `vivflow hw` creates a project, synthesizes, implements, writes a bitstream
//! and programs the board. `vivflow sim` runs a behavioral simulation.
//! `vivflow flow` runs the hardware flow on an existing project.

#![warn(missing_docs)]

mod flow;
mod hw;
mod pipeline;
mod prompt;
mod report;
mod sim;
mod stage;
mod ticker;

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

/// vivflow: Vivado workflows from the command line.
#[derive(Parser, Debug)]
#[command(name = "vivflow", version, about = "Vivado hardware and simulation workflows")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `vivflow.toml` file or a directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// External tool executable (overrides `[tool] path`).
    #[arg(long, global = true)]
    pub tool: Option<String>,

    /// Kill a batch run after this many seconds (overrides `[tool] timeout_secs`).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output format for the final report.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project from sources, build a bitstream and program the board.
    Hw(HwArgs),
    /// Create a project from sources and run a behavioral simulation.
    Sim(SimArgs),
    /// Run the hardware flow on an existing project.
    Flow(FlowArgs),
}

/// Arguments for `vivflow hw`.
#[derive(Parser, Debug)]
pub struct HwArgs {
    /// Directory containing the Verilog sources.
    pub source_dir: String,

    /// Target board (`basys3`, `arty`, or one from `vivflow.toml`).
    #[arg(short, long)]
    pub board: Option<String>,

    /// Generate the bitstream but do not program the device.
    #[arg(long)]
    pub no_program: bool,

    /// Open the device manager after programming.
    #[arg(long)]
    pub gui: bool,

    /// Use the first design file as top when no `*_top.v` file exists.
    #[arg(long)]
    pub implicit_top: bool,

    /// Continue without asking when no constraint file is found.
    #[arg(short, long)]
    pub yes: bool,

    /// Constraint file to use instead of searching for one.
    #[arg(long)]
    pub constraint: Option<String>,
}

/// Arguments for `vivflow sim`.
#[derive(Parser, Debug)]
pub struct SimArgs {
    /// Directory containing the Verilog sources and testbench.
    pub source_dir: String,

    /// Target board.
    #[arg(short, long)]
    pub board: Option<String>,

    /// Simulation time, passed to the tool as given (e.g. "500ns", "10us").
    #[arg(short, long)]
    pub time: Option<String>,

    /// Open the simulation in the tool's GUI instead of running in batch mode.
    #[arg(long, conflicts_with = "no_gui")]
    pub gui: bool,

    /// Run in batch mode and save the waveform for later (default).
    #[arg(long)]
    pub no_gui: bool,

    /// Do not add signals to the waveform view.
    #[arg(long)]
    pub no_wave: bool,
}

/// Arguments for `vivflow flow`.
#[derive(Parser, Debug)]
pub struct FlowArgs {
    /// Directory containing the `.xpr` project file.
    pub project_dir: String,

    /// Project name, without the `.xpr` extension.
    pub project_name: String,

    /// Generate the bitstream but do not program the device.
    #[arg(long)]
    pub no_program: bool,
}

/// Final report format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Tool executable override.
    pub tool: Option<String>,
    /// Timeout override in seconds.
    pub timeout: Option<u64>,
    /// Final report format.
    pub format: OutputFormat,
    /// Raised by the interrupt handler.
    pub cancel: Arc<AtomicBool>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(cancel.clone());

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        tool: cli.tool,
        timeout: cli.timeout,
        format: cli.format,
        cancel,
    };

    let result = match cli.command {
        Command::Hw(ref args) => hw::run(args, &global),
        Command::Sim(ref args) => sim::run(args, &global),
        Command::Flow(ref args) => flow::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(log::LevelFilter::Error);
    }
    builder.format_timestamp(None);
    let _ = builder.try_init();
}

/// First interrupt cancels the running tool; a second one exits immediately.
fn install_interrupt_handler(cancel: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::SeqCst) {
            process::exit(130);
        }
        eprintln!("\ninterrupt received, stopping (press Ctrl-C again to exit now)");
    });
    if let Err(e) = result {
        log::warn!("could not install interrupt handler: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_hw_default() {
        let cli = Cli::parse_from(["vivflow", "hw", "."]);
        match cli.command {
            Command::Hw(ref args) => {
                assert_eq!(args.source_dir, ".");
                assert!(args.board.is_none());
                assert!(!args.no_program);
                assert!(!args.gui);
                assert!(!args.implicit_top);
                assert!(!args.yes);
                assert!(args.constraint.is_none());
            }
            _ => panic!("expected Hw command"),
        }
    }

    #[test]
    fn parse_hw_with_args() {
        let cli = Cli::parse_from([
            "vivflow",
            "hw",
            "designs/blinky",
            "--board",
            "arty",
            "--no-program",
            "--implicit-top",
            "--yes",
            "--constraint",
            "pins.xdc",
        ]);
        match cli.command {
            Command::Hw(ref args) => {
                assert_eq!(args.source_dir, "designs/blinky");
                assert_eq!(args.board.as_deref(), Some("arty"));
                assert!(args.no_program);
                assert!(args.implicit_top);
                assert!(args.yes);
                assert_eq!(args.constraint.as_deref(), Some("pins.xdc"));
            }
            _ => panic!("expected Hw command"),
        }
    }

    #[test]
    fn parse_sim_default() {
        let cli = Cli::parse_from(["vivflow", "sim", "adder"]);
        match cli.command {
            Command::Sim(ref args) => {
                assert_eq!(args.source_dir, "adder");
                assert!(args.time.is_none());
                assert!(!args.gui);
                assert!(!args.no_gui);
                assert!(!args.no_wave);
            }
            _ => panic!("expected Sim command"),
        }
    }

    #[test]
    fn parse_sim_with_time_and_gui() {
        let cli = Cli::parse_from(["vivflow", "sim", ".", "--time", "10us", "--gui"]);
        match cli.command {
            Command::Sim(ref args) => {
                assert_eq!(args.time.as_deref(), Some("10us"));
                assert!(args.gui);
            }
            _ => panic!("expected Sim command"),
        }
    }

    #[test]
    fn sim_gui_conflicts_with_no_gui() {
        let result = Cli::try_parse_from(["vivflow", "sim", ".", "--gui", "--no-gui"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_flow() {
        let cli = Cli::parse_from(["vivflow", "flow", "/proj", "blinky", "--no-program"]);
        match cli.command {
            Command::Flow(ref args) => {
                assert_eq!(args.project_dir, "/proj");
                assert_eq!(args.project_name, "blinky");
                assert!(args.no_program);
            }
            _ => panic!("expected Flow command"),
        }
    }

    #[test]
    fn flow_requires_name() {
        assert!(Cli::try_parse_from(["vivflow", "flow", "/proj"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "vivflow",
            "--quiet",
            "--tool",
            "/opt/Xilinx/bin/vivado",
            "--timeout",
            "600",
            "--format",
            "json",
            "sim",
            ".",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.tool.as_deref(), Some("/opt/Xilinx/bin/vivado"));
        assert_eq!(cli.timeout, Some(600));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["vivflow", "hw", ".", "--verbose", "--config", "ci.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("ci.toml"));
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["vivflow", "--timeout", "0", "hw", "."]).is_err());
    }

    #[test]
    fn format_defaults_to_text() {
        let cli = Cli::parse_from(["vivflow", "hw", "."]);
        assert_eq!(cli.format, OutputFormat::Text);
    }
}
