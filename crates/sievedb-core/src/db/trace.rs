//! Search tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect
//! search semantics.

///
/// QueryTraceSink
///

pub trait QueryTraceSink: Send + Sync {
    fn on_event(&self, event: QueryTraceEvent);
}

///
/// QueryTraceEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryTraceEvent {
    /// A search compiled into a composed query.
    Compile { entity: &'static str },
    /// The datasource materialized a result set.
    Execute { entity: &'static str, rows: u64 },
}
