use std::env;

use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::exception::Exception;
use crate::exception::Severity;

pub mod id_generator;

pub fn init() {
    unsafe { env::set_var("RUST_BACKTRACE", "1") };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false) // generally cloud log console doesn't support color
                .with_line_number(true)
                .with_thread_ids(true)
                .with_filter(LevelFilter::INFO),
        )
        .init();
}

pub fn log_exception(e: &Exception) {
    let message = &e.message;
    match e.severity {
        Severity::Warn => match e.code {
            Some(ref error_code) => warn!(error_code, backtrace = e.to_string(), "{message}"),
            None => warn!(backtrace = e.to_string(), "{message}"),
        },
        Severity::Error => match e.code {
            Some(ref error_code) => error!(error_code, backtrace = e.to_string(), "{message}"),
            None => error!(backtrace = e.to_string(), "{message}"),
        },
    }
}
