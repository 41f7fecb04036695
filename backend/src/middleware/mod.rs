//! Actix middleware shared by every route.

mod trace;

pub use trace::{Trace, TraceMiddleware};
