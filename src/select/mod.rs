//! Response projection module
//!
//! Selectors decide what an invocation outputs: the whole response (`*`),
//! one response field (`Field`), or the value of an input parameter
//! (`^Parameter`). Selectors are resolved against the operation model once,
//! before any call, so a bad selector never costs a round trip.

mod selector;

pub use selector::{enumerate, ResolvedSelector, Selector};
