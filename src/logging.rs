//! Logging setup for the `artres` binary.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "artres=info,artres_store=info";

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "artres=debug,artres_store=debug";

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`:
/// - RUST_LOG=debug artres locate ...  (everything at debug)
/// - artres --verbose locate ...       (artres crates at debug)
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
}
