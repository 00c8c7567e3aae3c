pub mod span;
pub mod zipkin;
