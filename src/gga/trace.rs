//! Progress reporting.
//!
//! A [`TraceSink`] receives tagged progress records from a run. Sinks are
//! purely observational: nothing they do changes the search.
//!
//! | Tag | When |
//! |-----|------|
//! | `start` | after validation, before the initial population is built |
//! | `generation` | after every ranking pass |
//! | `improved` | when a new best-ever chromosome is recorded |
//! | `end` | once the run terminates |

/// Receiver of run progress records.
///
/// Any `Fn(&str, &str, &str) + Send + Sync` closure is a sink.
pub trait TraceSink: Send + Sync {
    /// Records an event. `attrs` is a space-separated `key=value` list.
    fn emit(&self, tag: &str, attrs: &str, text: &str);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn emit(&self, _tag: &str, _attrs: &str, _text: &str) {}
}

/// Forwards every record to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, tag: &str, attrs: &str, text: &str) {
        tracing::debug!(target: "u_grouping::trace", tag, attrs, "{text}");
    }
}

impl<F> TraceSink for F
where
    F: Fn(&str, &str, &str) + Send + Sync,
{
    fn emit(&self, tag: &str, attrs: &str, text: &str) {
        self(tag, attrs, text)
    }
}
