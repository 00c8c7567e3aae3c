use otzip_core::ids::{SpanId, TraceId};
use otzip_core::model::span::{SpanKind, SpanRecord};
use otzip_core::model::zipkin::{Kind, SpanModel, ZipkinTraceId};
use tracing::debug;

use crate::annotations::to_zipkin_annotations;
use crate::tags::to_zipkin_tags;

/// Converts a batch one-to-one, preserving order.
pub fn to_zipkin_span_models(batch: &[SpanRecord]) -> Vec<SpanModel> {
    let models: Vec<SpanModel> = batch.iter().map(to_zipkin_span_model).collect();
    debug!(spans = models.len(), "converted span batch");
    models
}

pub fn to_zipkin_span_model(record: &SpanRecord) -> SpanModel {
    SpanModel {
        trace_id: to_zipkin_trace_id(&record.trace_id),
        id: to_zipkin_id(&record.span_id),
        parent_id: to_zipkin_parent_id(&record.parent_span_id),
        debug: false,
        sampled: None,
        err: None,
        name: record.name.clone(),
        kind: to_zipkin_kind(record.kind),
        timestamp: record.start_time,
        duration: record.end_time - record.start_time,
        shared: false,
        local_endpoint: None,
        remote_endpoint: None,
        annotations: to_zipkin_annotations(&record.events),
        tags: to_zipkin_tags(record),
    }
}

pub fn to_zipkin_trace_id(id: &TraceId) -> ZipkinTraceId {
    let raw = u128::from_be_bytes(*id.as_bytes());
    ZipkinTraceId {
        high: (raw >> 64) as u64,
        low: raw as u64,
    }
}

pub fn to_zipkin_id(id: &SpanId) -> u64 {
    u64::from_be_bytes(*id.as_bytes())
}

/// A zero parent marks a root span and is never emitted as an explicit 0.
pub fn to_zipkin_parent_id(id: &SpanId) -> Option<u64> {
    if id.is_zero() {
        return None;
    }
    Some(to_zipkin_id(id))
}

pub const fn to_zipkin_kind(kind: SpanKind) -> Kind {
    match kind {
        SpanKind::Server => Kind::Server,
        SpanKind::Client => Kind::Client,
        SpanKind::Producer => Kind::Producer,
        SpanKind::Consumer => Kind::Consumer,
        SpanKind::Internal | SpanKind::Unspecified => Kind::Undetermined,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use otzip_core::model::span::{KeyValue, SpanEvent, StatusCode};

    use super::*;

    fn record() -> SpanRecord {
        let base = Utc.with_ymd_and_hms(2020, 3, 11, 19, 24, 0).unwrap();
        SpanRecord {
            trace_id: TraceId::from_bytes([
                0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
                0x0d, 0x0e, 0x0f,
            ]),
            span_id: SpanId::from_bytes([0xff, 0xfe, 0xfd, 0xfc, 0xfb, 0xfa, 0xf9, 0xf8]),
            parent_span_id: SpanId::from_bytes([0x3f, 0x3e, 0x3d, 0x3c, 0x3b, 0x3a, 0x39, 0x38]),
            kind: SpanKind::Server,
            name: "foo".into(),
            start_time: base,
            end_time: base + TimeDelta::minutes(1),
            attributes: vec![KeyValue::new("attr1", 42u64)],
            events: vec![SpanEvent {
                time: base + TimeDelta::seconds(30),
                name: "ev1".into(),
                attributes: vec![],
            }],
            status_code: StatusCode::NotFound,
            status_message: String::new(),
        }
    }

    #[test]
    fn splits_trace_id_big_endian() {
        let id = to_zipkin_trace_id(&record().trace_id);
        assert_eq!(id.high, 0x0001020304050607);
        assert_eq!(id.low, 0x08090a0b0c0d0e0f);
    }

    #[test]
    fn span_id_is_big_endian() {
        assert_eq!(to_zipkin_id(&record().span_id), 0xfffefdfcfbfaf9f8);
    }

    #[test]
    fn zero_parent_is_absent() {
        assert_eq!(to_zipkin_parent_id(&SpanId::ZERO), None);
        assert_eq!(
            to_zipkin_parent_id(&record().parent_span_id),
            Some(0x3f3e3d3c3b3a3938)
        );
    }

    #[test]
    fn kind_table() {
        let cases = [
            (SpanKind::Server, "SERVER"),
            (SpanKind::Client, "CLIENT"),
            (SpanKind::Producer, "PRODUCER"),
            (SpanKind::Consumer, "CONSUMER"),
            (SpanKind::Internal, ""),
            (SpanKind::Unspecified, ""),
        ];
        for (input, token) in cases {
            assert_eq!(to_zipkin_kind(input).as_str(), token, "{input:?}");
        }
    }

    #[test]
    fn fixed_fields_are_never_set() {
        let model = to_zipkin_span_model(&record());
        assert!(!model.debug);
        assert!(!model.shared);
        assert_eq!(model.sampled, None);
        assert_eq!(model.err, None);
        assert_eq!(model.local_endpoint, None);
        assert_eq!(model.remote_endpoint, None);
    }

    #[test]
    fn timing_uses_start_and_elapsed() {
        let input = record();
        let model = to_zipkin_span_model(&input);
        assert_eq!(model.timestamp, input.start_time);
        assert_eq!(model.duration, TimeDelta::minutes(1));
        assert_eq!(model.name, "foo");
    }

    #[test]
    fn empty_batch_yields_empty_output() {
        assert!(to_zipkin_span_models(&[]).is_empty());
    }
}
