use clap::{Parser, Subcommand};
use compactcode::bench::{self, Operation};
use compactcode::codec::{CodecConfig, DEFAULT_MAX_DEPTH};
use compactcode::harness::{BenchConfig, Profile};
use compactcode::registry;
use compactcode::report::{BenchReport, RunMeta};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand, Debug)]
enum Command {
    /// Run serialization benchmarks (default).
    Run {
        /// Shape to benchmark. Can be provided multiple times; defaults to the whole catalog.
        #[arg(short, long, value_name = "NAME", action = clap::ArgAction::Append)]
        shape: Vec<String>,

        /// Operation to measure. Can be provided multiple times; defaults to all four.
        #[arg(long, value_enum, action = clap::ArgAction::Append)]
        op: Vec<Operation>,
    },

    /// Print the registered shapes as JSON.
    ListShapes,
}

#[derive(Parser, Debug)]
#[command(name = "compactcode-bench")]
#[command(about = "Compact protocol serialization benchmark runner (JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = Profile::Quick, global = true)]
    profile: Profile,

    /// Maximum struct/container nesting accepted by the codec.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, global = true)]
    max_depth: usize,

    /// Where to write the JSON report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

fn now_utc() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn emit(json: String, out: Option<PathBuf>) -> std::io::Result<()> {
    if let Some(out) = out {
        fs::write(out, json)
    } else {
        println!("{json}");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let reg = registry::global()?;

    let (shapes, ops) = match args.cmd {
        Some(Command::ListShapes) => {
            let shapes: Vec<_> = reg
                .names()
                .filter_map(|n| reg.shape(n).map(|s| &**s))
                .collect();
            emit(serde_json::to_string_pretty(&shapes)?, args.out)?;
            return Ok(());
        }
        Some(Command::Run { shape, op }) => (shape, op),
        None => (Vec::new(), Vec::new()),
    };

    let shapes = if shapes.is_empty() {
        reg.names().map(str::to_string).collect()
    } else {
        shapes
    };
    let ops = if ops.is_empty() {
        Operation::ALL.to_vec()
    } else {
        ops
    };

    let cfg = BenchConfig {
        profile: args.profile,
        codec: CodecConfig {
            max_depth: args.max_depth,
        },
    };

    let measurements = bench::run(&cfg, reg, &shapes, &ops)?;

    let report = BenchReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            max_depth: cfg.codec.max_depth,
            timestamp_utc: now_utc(),
        },
        measurements,
    };

    emit(serde_json::to_string_pretty(&report)?, args.out)?;
    Ok(())
}
