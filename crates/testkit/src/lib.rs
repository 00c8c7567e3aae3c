use chrono::{DateTime, Duration, TimeZone, Utc};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::any_value::Value;
use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue as OtlpKeyValue};
use opentelemetry_proto::tonic::trace::v1::span::Event as OtlpEvent;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span as OtlpSpan};
use otzip_core::ids::{SpanId, TraceId};
use otzip_core::model::span::{KeyValue, SpanEvent, SpanKind, SpanRecord, StatusCode};

pub const TRACE_ID: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
];
pub const SPAN_ID: [u8; 8] = [0xFF, 0xFE, 0xFD, 0xFC, 0xFB, 0xFA, 0xF9, 0xF8];
pub const PARENT_ID: [u8; 8] = [0x3F, 0x3E, 0x3D, 0x3C, 0x3B, 0x3A, 0x39, 0x38];
pub const STATUS_MESSAGE: &str = "404, file not found";

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 11, 19, 24, 0).unwrap()
}

/// Server span with two attributes and two events, one with attributes.
pub fn typical_span() -> SpanRecord {
    let base = base_time();
    SpanRecord {
        trace_id: TraceId::from_bytes(TRACE_ID),
        span_id: SpanId::from_bytes(SPAN_ID),
        parent_span_id: SpanId::from_bytes(PARENT_ID),
        kind: SpanKind::Server,
        name: "foo".to_string(),
        start_time: base,
        end_time: base + Duration::minutes(1),
        attributes: vec![KeyValue::new("attr1", 42u64), KeyValue::new("attr2", "bar")],
        events: vec![
            SpanEvent {
                time: base + Duration::seconds(30),
                name: "ev1".to_string(),
                attributes: vec![KeyValue::new("eventattr1", 123u64)],
            },
            SpanEvent {
                time: base + Duration::seconds(45),
                name: "ev2".to_string(),
                attributes: vec![],
            },
        ],
        status_code: StatusCode::NotFound,
        status_message: STATUS_MESSAGE.to_string(),
    }
}

/// Typical, no parent, each kind but server, no events, `error=false`.
pub fn sample_batch() -> Vec<SpanRecord> {
    let with_kind = |kind: SpanKind| SpanRecord {
        kind,
        ..typical_span()
    };

    vec![
        typical_span(),
        SpanRecord {
            parent_span_id: SpanId::ZERO,
            ..typical_span()
        },
        with_kind(SpanKind::Unspecified),
        with_kind(SpanKind::Internal),
        with_kind(SpanKind::Client),
        with_kind(SpanKind::Producer),
        with_kind(SpanKind::Consumer),
        SpanRecord {
            events: vec![],
            ..typical_span()
        },
        SpanRecord {
            attributes: vec![KeyValue::new("error", "false")],
            ..typical_span()
        },
    ]
}

fn otlp_kv(key: &str, value: Value) -> OtlpKeyValue {
    OtlpKeyValue {
        key: key.to_string(),
        value: Some(AnyValue { value: Some(value) }),
    }
}

fn unix_nanos(ts: DateTime<Utc>) -> u64 {
    ts.timestamp_nanos_opt().unwrap_or_default() as u64
}

/// [`typical_span`] as an OTLP export request, repeated `count` times with
/// distinct names `span-0`, `span-1`, ...
pub fn otlp_request(count: usize) -> ExportTraceServiceRequest {
    let base = base_time();
    let spans = (0..count)
        .map(|i| OtlpSpan {
            trace_id: TRACE_ID.to_vec(),
            span_id: SPAN_ID.to_vec(),
            parent_span_id: PARENT_ID.to_vec(),
            name: format!("span-{i}"),
            kind: 2,
            start_time_unix_nano: unix_nanos(base),
            end_time_unix_nano: unix_nanos(base + Duration::minutes(1)),
            attributes: vec![
                otlp_kv("attr1", Value::IntValue(42)),
                otlp_kv("attr2", Value::StringValue("bar".to_string())),
            ],
            events: vec![OtlpEvent {
                time_unix_nano: unix_nanos(base + Duration::seconds(30)),
                name: "ev1".to_string(),
                attributes: vec![otlp_kv("eventattr1", Value::IntValue(123))],
                dropped_attributes_count: 0,
            }],
            ..Default::default()
        })
        .collect();

    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            scope_spans: vec![ScopeSpans {
                spans,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}
