//! Request building module
//!
//! Maps explicitly supplied parameters onto service request objects.
//!
//! # Overview
//!
//! - `BoundParameters` - what the caller actually supplied
//! - `RequestBuilder` / `Request` - members keyed by wire path; unset members are absent
//! - Coercion of textual and JSON input into declared parameter types

mod builder;
mod coerce;
mod params;

pub use builder::{Request, RequestBuilder};
pub use coerce::{coerce_str, coerce_value};
pub use params::{build_request, BoundParameters};
