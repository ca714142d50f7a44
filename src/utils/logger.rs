use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives when `RUST_LOG` is unset. The HTTP stack stays quiet
/// even in verbose mode; SOAP calls are traced by this crate at debug.
fn filter_directives(verbose: bool) -> &'static str {
    if verbose {
        "salesforce_storage=debug,reqwest=info,hyper=warn,hyper_util=warn,rustls=warn,info"
    } else {
        "salesforce_storage=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// One JSON object per event, for runs whose output is collected by a log pipeline.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .json()
                .with_current_span(false),
        )
        .init();
}
