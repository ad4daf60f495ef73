//! Log output for scheduled runs.
//!
//! Reports run unattended from cron or a systemd timer, so diagnostics go to
//! stderr and stay out of whatever the scheduler captures from stdout.
//! `RUST_LOG` overrides the level chosen on the command line, e.g.
//! `RUST_LOG=hass_insights_core=debug` to see every judge verdict.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Install the process-wide subscriber; a second call is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let output: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    // Already installed by an earlier call or a test harness.
    let _ = tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init();
}
