//! Observability subsystem for idfkit
//!
//! Structured events emitted through `tracing`. The library never installs
//! a subscriber; the CLI does (see [`init_logging`]).
//!
//! # Usage
//!
//! ```ignore
//! use idfkit::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordAdded, &[("record_type", "Zone")]);
//! ```

mod events;

pub use events::Event;

use std::fmt;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Renders `[(k, v), ...]` as `k=v k=v`, keys sorted for deterministic output.
struct Fields<'a>(&'a [(&'a str, &'a str)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<_> = self.0.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);
        for (i, (key, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={:?}", key, value)?;
        }
        Ok(())
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let fields = Fields(fields);
    let level = event.level();
    if level == Level::ERROR {
        tracing::error!(event = event.as_str(), "{}", fields);
    } else if level == Level::WARN {
        tracing::warn!(event = event.as_str(), "{}", fields);
    } else if level == Level::INFO {
        tracing::info!(event = event.as_str(), "{}", fields);
    } else if level == Level::DEBUG {
        tracing::debug!(event = event.as_str(), "{}", fields);
    } else {
        tracing::trace!(event = event.as_str(), "{}", fields);
    }
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "idfkit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
