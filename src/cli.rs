use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lifcore",
    version,
    about = "Cycle-stepped model of a serially configurable LIF neuron core",
    long_about = None
)]
pub struct Cli {
    /// Core configuration (JSON); built-in defaults when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// `RUST_LOG` directives (or `info`), with `-v`/`-vv` replacing the global level.
    /// Per-target directives from `RUST_LOG` still apply.
    pub fn log_filter(&self, env: Option<&str>) -> EnvFilter {
        let filter = env
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("info"));

        match self.verbose {
            0 => filter,
            1 => filter.add_directive(LevelFilter::DEBUG.into()),
            _ => filter.add_directive(LevelFilter::TRACE.into()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a testbench scenario
    Run(RunArgs),
    /// Show the serial frame for a parameter set and simulate loading it
    Load(LoadArgs),
    /// Drive the core with a stimulus and export the trace
    Trace(TraceArgs),
    /// Open the live viewer
    Gui,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (JSON)
    #[arg(long, conflicts_with = "builtin")]
    pub scenario: Option<PathBuf>,

    /// Built-in scenario name
    #[arg(long, default_value = "basic")]
    pub builtin: String,

    /// Print every cycle
    #[arg(long)]
    pub table: bool,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// weight_a,weight_b,leak,threshold (decimal or 0x hex)
    #[arg(long)]
    pub params: String,
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    #[arg(long, default_value_t = 3)]
    pub channel_a: u8,

    #[arg(long, default_value_t = 3)]
    pub channel_b: u8,

    /// Stimulus schedule (JSON), overrides the channel levels
    #[arg(long)]
    pub schedule: Option<String>,

    #[arg(long, default_value_t = 100)]
    pub cycles: u64,

    /// Parameter preset loaded serially before the run
    #[arg(long)]
    pub preset: Option<String>,

    /// Perturb the preset by up to this much per field
    #[arg(long, default_value_t = 0)]
    pub jitter: u8,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// HTML plot destination
    #[arg(long)]
    pub out: Option<PathBuf>,
}
