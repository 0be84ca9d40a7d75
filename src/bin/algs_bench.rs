use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use algs_bench::alloc::CountingAlloc;
use algs_bench::harness::{BenchConfig, Profile, Sampler};
use algs_bench::schema::{BenchReport, RunMeta};
use algs_bench::{workloads, BenchError, Benchmark, ErrorPolicy, Runner};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "algs-bench")]
#[command(about = "Quick, approximate micro-benchmarks with parameter sweeps")]
struct Args {
    /// Benchmark to run, with or without its "Benchmarks" suffix.
    #[arg(value_name = "NAME", required_unless_present = "list")]
    name: Option<String>,

    /// List registered benchmarks and exit.
    #[arg(long, default_value_t = false)]
    list: bool,

    #[arg(long, value_enum, default_value_t = ProfileArg::Quick)]
    profile: ProfileArg,

    /// Seed for generated inputs.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Window length in microseconds (overrides the profile).
    #[arg(long, value_name = "US")]
    window_us: Option<u64>,

    /// Trailing windows that must agree (overrides the profile).
    #[arg(long)]
    measurements: Option<usize>,

    /// Largest accepted max/min rate ratio (overrides the profile).
    #[arg(long)]
    steady_factor: Option<f64>,

    /// Windows to try before giving up (overrides the profile).
    #[arg(long)]
    abort_after: Option<usize>,

    /// Continue with the next operation when one fails to converge.
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    /// Print the JSON report instead of tables.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write the JSON report to this file.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

impl Args {
    fn bench_config(&self) -> BenchConfig {
        let mut cfg = BenchConfig::new(self.profile.into(), self.seed);
        if let Some(us) = self.window_us {
            cfg.sampler.window = Duration::from_micros(us.max(1));
        }
        if let Some(n) = self.measurements {
            cfg.sampler.num_measurements = n.max(1);
        }
        if let Some(f) = self.steady_factor {
            cfg.sampler.steady_factor = f;
        }
        if let Some(n) = self.abort_after {
            cfg.sampler.abort_after = n;
        }
        cfg
    }
}

fn now_utc() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("algs_bench=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<bool, BenchError> {
    let cfg = args.bench_config();
    let registry = workloads::registry(&cfg);

    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(true);
    }

    let Some(name) = args.name.as_deref() else {
        return Ok(false);
    };
    let Some(bench) = registry.find(name)? else {
        eprintln!("Could not find benchmark {name}");
        return Ok(false);
    };

    let policy = if args.keep_going {
        ErrorPolicy::KeepGoing
    } else {
        ErrorPolicy::FailFast
    };
    let runner = Runner::new(Sampler::new(cfg.sampler), policy);

    let outcome = if args.json {
        runner.run(bench, &mut io::sink())?
    } else {
        runner.run(bench, &mut io::stdout().lock())?
    };

    if args.json || args.out.is_some() {
        let report = BenchReport::new(
            RunMeta {
                schema_version: 1,
                bench_version: env!("CARGO_PKG_VERSION").to_string(),
                benchmark: bench.name().to_string(),
                profile: cfg.profile.as_str().to_string(),
                seed: cfg.seed,
                timestamp_utc: now_utc(),
                git_sha: git_sha_short(),
            },
            &outcome.results,
        );
        let json = serde_json::to_string_pretty(&report)?;
        if let Some(out) = &args.out {
            fs::write(out, &json)?;
        }
        if args.json {
            println!("{json}");
        }
    }

    Ok(outcome.is_success())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
