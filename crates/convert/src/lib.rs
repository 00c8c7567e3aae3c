//! Conversion of finished OpenTelemetry spans into the Zipkin v2 model.
//!
//! [`to_zipkin_span_models`] is the entry point. It is a pure function of
//! its input: no I/O, no shared state, output order equals input order.

pub mod annotations;
pub mod convert;
pub mod otlp;
pub mod tags;
pub mod wire;

pub use convert::{to_zipkin_span_model, to_zipkin_span_models};
pub use wire::encode_json;
