/*!
 * Monitoring
 * Tracing subscriber initialisation for binaries and tests
 */

mod tracer;

pub use tracer::{init_tracing, TRACE_JSON_ENV};
