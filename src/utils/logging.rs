use tracing_subscriber::EnvFilter;

use crate::Result;

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "portwho=debug"
    } else {
        "warn"
    }
}
