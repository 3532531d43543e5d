use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use anyhow::anyhow;
use anyhow::ensure;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hlife::Cellspace;
use hlife::cellspace::Stats;
use hlife::config::Config;

struct Report {
    build: Duration,
    result: Duration,
    cells: usize,
    stats: Stats,
    stable: bool,
}

/// Build the all-dead cell of the given level, then compute its result.
fn generate(level: u32) -> Report {
    let mut space = Cellspace::new();

    let t = Instant::now();
    let root = space.empty(level);
    let build = t.elapsed();

    let t = Instant::now();
    let res = root.result(&mut space, level);
    let result = t.elapsed();

    let stable = res == space.empty(level - 1);

    Report {
        build,
        result,
        cells: space.len(),
        stats: space.stats(),
        stable,
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(std::env::args().skip(1))?;
    info!(level = config.level, stack_mb = config.stack_mb, "generating");

    // The recursion is as deep as the world is tall
    let level = config.level;
    let worker = thread::Builder::new()
        .name("generate".to_string())
        .stack_size(config.stack_size())
        .spawn(move || generate(level))
        .context("Failed to spawn the evaluation thread")?;

    let report = worker
        .join()
        .map_err(|_| anyhow!("Evaluation thread panicked"))?;

    info!(
        build = ?report.build,
        result = ?report.result,
        cells = report.cells,
        stats = ?report.stats,
        "done"
    );

    ensure!(report.stable, "The empty world did not stay empty");

    println!("generate-{level}: {:?}", report.build + report.result);

    Ok(())
}
