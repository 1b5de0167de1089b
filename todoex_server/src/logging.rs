//! Structured logging configuration.
//!
//! Console output through `tracing-subscriber`, filtered by `RUST_LOG`, plus
//! helpers for authentication failure events.

use todoex::auth::UserId;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,tower_http=info";

/// Initialize structured logging
///
/// Log levels come from the `RUST_LOG` env var, falling back to
/// [`DEFAULT_FILTER`]. Calling this twice is harmless; the second call is
/// ignored.
///
/// # Example
///
/// ```no_run
/// use todoex_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!("Structured logging initialized");
    }
}

/// Log an authentication failure with structured data
///
/// # Arguments
///
/// * `event` - Kind of failure, e.g. `failed_login`
/// * `user_id` - Caller, when already known
/// * `reason` - Human-readable reason
///
/// # Example
///
/// ```
/// use todoex_server::logging::log_auth_failure;
///
/// log_auth_failure("failed_login", None, "invalid email or password");
/// ```
pub fn log_auth_failure(event: &str, user_id: Option<UserId>, reason: &str) {
    tracing::warn!(
        event = event,
        user_id = user_id.map(tracing::field::display),
        reason = reason,
        "AUTH: {}",
        reason
    );
}
