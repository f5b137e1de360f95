//! Tracing/logging bootstrap for LIBRIS.

use libris_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber according to settings.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Fails if a
/// subscriber is already installed, so tests should use [`try_init`].
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    try_init(settings).map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

/// Like [`init`], but surfaces the subscriber error for callers that can
/// tolerate an already-installed subscriber (tests, embedded use).
pub fn try_init(
    settings: &TelemetrySettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_init_is_tolerable_when_called_twice() {
        let settings = TelemetrySettings::default();

        // Whichever call wins the race to install the global subscriber, the
        // second must fail without panicking.
        let first = try_init(&settings);
        let second = try_init(&settings);
        assert!(first.is_ok() || second.is_err());
    }
}
