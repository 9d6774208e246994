//! SkipKV Stress Test
//!
//! Measures multi-threaded insert and search throughput on a shared skip list.

use std::time::{Duration, Instant};

use clap::Parser;
use rand::Rng;
use skipkv::SkipList;
use tracing_subscriber::{fmt, EnvFilter};

/// SkipKV stress test
#[derive(Parser, Debug)]
#[command(name = "skipkv-stress")]
#[command(about = "Concurrent insert/search throughput for the SkipKV index")]
#[command(version)]
struct Args {
    /// Worker threads per phase
    #[arg(short, long, default_value = "4")]
    threads: usize,

    /// Total operations per phase (keys are drawn from 0..ops)
    #[arg(short, long, default_value = "100000")]
    ops: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,skipkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    if args.threads == 0 || args.ops == 0 {
        tracing::error!("--threads and --ops must be positive");
        std::process::exit(1);
    }

    let list: SkipList<usize, String> = SkipList::new();
    let per_thread = args.ops / args.threads;
    let key_space = args.ops;

    let elapsed = run_phase(args.threads, |thread_id| {
        tracing::debug!("Insert thread {} started", thread_id);
        let mut rng = rand::thread_rng();
        for _ in 0..per_thread {
            list.insert(rng.gen_range(0..key_space), "value".to_string());
        }
    });
    report("Insert", &args, elapsed);

    let elapsed = run_phase(args.threads, |thread_id| {
        tracing::debug!("Get thread {} started", thread_id);
        let mut rng = rand::thread_rng();
        for _ in 0..per_thread {
            let _ = list.search(&rng.gen_range(0..key_space));
        }
    });
    report("Get", &args, elapsed);

    tracing::info!("{} distinct keys, level {}", list.len(), list.level());
    if let Err(e) = list.check_invariants() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Run `work` on `threads` scoped workers and time the whole phase
fn run_phase<F>(threads: usize, work: F) -> Duration
where
    F: Fn(usize) + Sync,
{
    let start = Instant::now();
    let result = crossbeam::scope(|scope| {
        for thread_id in 0..threads {
            let work = &work;
            scope.spawn(move |_| work(thread_id));
        }
    });

    if result.is_err() {
        tracing::error!("A worker thread panicked");
        std::process::exit(1);
    }
    start.elapsed()
}

fn report(phase: &str, args: &Args, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    println!("[{} Test] {} operations with {} threads", phase, args.ops, args.threads);
    println!("Total elapsed: {:.4} seconds", secs);
    println!("QPS: {:.0} ops/sec", args.ops as f64 / secs.max(f64::EPSILON));
}
