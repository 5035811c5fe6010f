//! Process-wide tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Call once at process start.
///
/// `RUST_LOG` wins over the defaults. Output goes to stderr so command
/// output on stdout stays machine readable.
pub fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "emoji_domain=debug,info"
    } else {
        "emoji_domain=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    // A second init (e.g. from tests) is a no-op.
    if json {
        let _ = registry.with(fmt.json()).try_init();
    } else {
        let _ = registry.with(fmt.compact()).try_init();
    }
}
