use queue_runner::config::Args;
use queue_runner::{Runner, RunnerConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    let config = RunnerConfig::from(args);
    tracing::debug!(?config, "starting runner");

    let summary = Runner::from_config(&config)?.run()?;
    tracing::info!(
        started = summary.started,
        completed = summary.completed,
        failed = summary.failed,
        "queue empty, exiting"
    );
    Ok(())
}
