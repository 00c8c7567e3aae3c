//! Decoding of OTLP trace payloads into [`SpanRecord`]s.

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::any_value::Value;
use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue as OtlpKeyValue};
use opentelemetry_proto::tonic::trace::v1::Span as OtlpSpan;
use opentelemetry_proto::tonic::trace::v1::span::Event as OtlpEvent;
use opentelemetry_proto::tonic::trace::v1::status::StatusCode as OtlpStatusCode;
use otzip_core::error::{OtzipError, Result};
use otzip_core::ids::{SpanId, TraceId};
use otzip_core::model::span::{AttrValue, KeyValue, SpanEvent, SpanKind, SpanRecord, StatusCode};
use otzip_core::time::nanos_to_dt;
use prost::Message;
use tracing::warn;

pub fn decode_bytes(body: &[u8], skip_invalid: bool) -> Result<Vec<SpanRecord>> {
    let req = ExportTraceServiceRequest::decode(body)
        .map_err(|e| OtzipError::Parse(format!("invalid OTLP trace payload: {e}")))?;
    decode_request(&req, skip_invalid)
}

/// Flattens resource and scope grouping, keeping payload order.
pub fn decode_request(
    req: &ExportTraceServiceRequest,
    skip_invalid: bool,
) -> Result<Vec<SpanRecord>> {
    let mut out = Vec::new();
    for resource_spans in &req.resource_spans {
        for scope_spans in &resource_spans.scope_spans {
            for span in &scope_spans.spans {
                match decode_span(span) {
                    Ok(record) => out.push(record),
                    Err(e) if skip_invalid => {
                        warn!(error = %e, name = %span.name, "skipping malformed span");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(out)
}

pub fn decode_span(span: &OtlpSpan) -> Result<SpanRecord> {
    let (status_code, status_message) = match &span.status {
        Some(status) => (status_code(status.code), status.message.clone()),
        None => (StatusCode::Ok, String::new()),
    };

    Ok(SpanRecord {
        trace_id: TraceId::from_slice(&span.trace_id)?,
        span_id: SpanId::from_slice(&span.span_id)?,
        parent_span_id: SpanId::from_slice(&span.parent_span_id)?,
        kind: SpanKind::from_otlp(span.kind),
        name: span.name.clone(),
        start_time: nanos_to_dt(span.start_time_unix_nano),
        end_time: nanos_to_dt(span.end_time_unix_nano),
        attributes: decode_attributes(&span.attributes),
        events: span.events.iter().map(decode_event).collect(),
        status_code,
        status_message,
    })
}

/// OTLP only distinguishes unset / ok / error; an error carries no finer
/// RPC code, so it becomes `Unknown`.
fn status_code(code: i32) -> StatusCode {
    if code == OtlpStatusCode::Error as i32 {
        StatusCode::Unknown
    } else {
        StatusCode::Ok
    }
}

fn decode_event(event: &OtlpEvent) -> SpanEvent {
    SpanEvent {
        time: nanos_to_dt(event.time_unix_nano),
        name: event.name.clone(),
        attributes: decode_attributes(&event.attributes),
    }
}

fn decode_attributes(attrs: &[OtlpKeyValue]) -> Vec<KeyValue> {
    attrs
        .iter()
        .map(|kv| KeyValue {
            key: kv.key.clone(),
            value: any_value_to_attr(kv.value.as_ref()),
        })
        .collect()
}

fn any_value_to_attr(value: Option<&AnyValue>) -> AttrValue {
    match value.and_then(|v| v.value.as_ref()) {
        Some(Value::StringValue(s)) => AttrValue::String(s.clone()),
        Some(Value::BoolValue(b)) => AttrValue::Bool(*b),
        Some(Value::IntValue(i)) => AttrValue::I64(*i),
        Some(Value::DoubleValue(d)) => AttrValue::F64(*d),
        Some(Value::BytesValue(b)) => AttrValue::String(bytes_to_hex(b)),
        Some(other) => AttrValue::String(complex_to_json(other).to_string()),
        None => AttrValue::String(String::new()),
    }
}

fn complex_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::StringValue(s) => serde_json::Value::String(s.clone()),
        Value::BoolValue(b) => serde_json::Value::Bool(*b),
        Value::IntValue(i) => serde_json::Value::from(*i),
        Value::DoubleValue(d) => serde_json::Value::from(*d),
        Value::BytesValue(b) => serde_json::Value::String(bytes_to_hex(b)),
        Value::ArrayValue(arr) => serde_json::Value::Array(
            arr.values
                .iter()
                .map(|v| v.value.as_ref().map(complex_to_json).unwrap_or_default())
                .collect(),
        ),
        Value::KvlistValue(list) => {
            let mut map = serde_json::Map::new();
            for kv in &list.values {
                let v = kv
                    .value
                    .as_ref()
                    .and_then(|v| v.value.as_ref())
                    .map(complex_to_json)
                    .unwrap_or_default();
                map.insert(kv.key.clone(), v);
            }
            serde_json::Value::Object(map)
        }
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}
