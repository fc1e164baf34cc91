//! Tracing setup, relocated from the teacher's CLI (`apps/cli/src/commands.rs`'s
//! `init_tracing`) since this workspace ships no CLI of its own — callers
//! that embed the engine call this once at startup instead.

use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize the global tracing subscriber. `verbosity` follows the
/// teacher's convention: 0 = info, 1 = debug, 2+ = trace, all scoped to
/// this workspace's crates. Respects `RUST_LOG` when set.
pub fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "docsforge=info",
        1 => "docsforge=debug",
        _ => "docsforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}
