//! Zipkin v2 JSON encoding of [`SpanModel`] batches.

use std::collections::BTreeMap;

use otzip_core::error::{OtzipError, Result};
use otzip_core::model::zipkin::{Annotation, Endpoint, SpanModel};
use otzip_core::time::{dt_to_micros, duration_to_micros};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSpan<'a> {
    trace_id: String,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sampled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    err: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    kind: &'static str,
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_endpoint: Option<WireEndpoint<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_endpoint: Option<WireEndpoint<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotations: Option<Vec<WireAnnotation<'a>>>,
    tags: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEndpoint<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    service_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipv6: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

#[derive(Serialize)]
struct WireAnnotation<'a> {
    timestamp: i64,
    value: &'a str,
}

impl<'a> From<&'a SpanModel> for WireSpan<'a> {
    fn from(span: &'a SpanModel) -> Self {
        let duration = duration_to_micros(span.duration);
        Self {
            trace_id: span.trace_id.to_hex(),
            id: format!("{:016x}", span.id),
            parent_id: span.parent_id.map(|id| format!("{id:016x}")),
            debug: span.debug.then_some(true),
            sampled: span.sampled,
            err: span.err.as_deref(),
            name: &span.name,
            kind: span.kind.as_str(),
            timestamp: dt_to_micros(&span.timestamp),
            duration: (duration != 0).then_some(duration),
            shared: span.shared.then_some(true),
            local_endpoint: span.local_endpoint.as_ref().map(WireEndpoint::from),
            remote_endpoint: span.remote_endpoint.as_ref().map(WireEndpoint::from),
            annotations: span
                .annotations
                .as_ref()
                .map(|list| list.iter().map(WireAnnotation::from).collect()),
            tags: &span.tags,
        }
    }
}

impl<'a> From<&'a Endpoint> for WireEndpoint<'a> {
    fn from(ep: &'a Endpoint) -> Self {
        Self {
            service_name: &ep.service_name,
            ipv4: ep.ipv4.map(|ip| ip.to_string()),
            ipv6: ep.ipv6.map(|ip| ip.to_string()),
            port: (ep.port != 0).then_some(ep.port),
        }
    }
}

impl<'a> From<&'a Annotation> for WireAnnotation<'a> {
    fn from(a: &'a Annotation) -> Self {
        Self {
            timestamp: dt_to_micros(&a.timestamp),
            value: &a.value,
        }
    }
}

/// Encodes a batch as a Zipkin v2 JSON array.
pub fn encode_json(spans: &[SpanModel], pretty: bool) -> Result<String> {
    let wire: Vec<WireSpan<'_>> = spans.iter().map(WireSpan::from).collect();
    let encoded = if pretty {
        serde_json::to_string_pretty(&wire)
    } else {
        serde_json::to_string(&wire)
    };
    encoded.map_err(|e| OtzipError::Encode(format!("zipkin json: {e}")))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use chrono::{TimeDelta, TimeZone, Utc};
    use otzip_core::model::zipkin::{Kind, ZipkinTraceId};
    use serde_json::{Value, json};

    use super::*;

    fn model() -> SpanModel {
        let ts = Utc.with_ymd_and_hms(2020, 3, 11, 19, 24, 0).unwrap();
        SpanModel {
            trace_id: ZipkinTraceId {
                high: 0x0001020304050607,
                low: 0x08090a0b0c0d0e0f,
            },
            id: 0xfffefdfcfbfaf9f8,
            parent_id: Some(0x3f3e3d3c3b3a3938),
            debug: false,
            sampled: None,
            err: None,
            name: "foo".into(),
            kind: Kind::Server,
            timestamp: ts,
            duration: TimeDelta::minutes(1),
            shared: false,
            local_endpoint: None,
            remote_endpoint: None,
            annotations: Some(vec![Annotation {
                timestamp: ts + TimeDelta::seconds(30),
                value: "ev2".into(),
            }]),
            tags: BTreeMap::from([("ot.status_code".to_string(), "NotFound".to_string())]),
        }
    }

    fn encode_one(span: SpanModel) -> Value {
        let raw = encode_json(&[span], false).unwrap();
        let mut parsed: Vec<Value> = serde_json::from_str(&raw).unwrap();
        parsed.remove(0)
    }

    #[test]
    fn encodes_zipkin_v2_fields() {
        assert_eq!(
            encode_one(model()),
            json!({
                "traceId": "000102030405060708090a0b0c0d0e0f",
                "id": "fffefdfcfbfaf9f8",
                "parentId": "3f3e3d3c3b3a3938",
                "name": "foo",
                "kind": "SERVER",
                "timestamp": 1_583_954_640_000_000i64,
                "duration": 60_000_000,
                "annotations": [
                    {"timestamp": 1_583_954_670_000_000i64, "value": "ev2"}
                ],
                "tags": {"ot.status_code": "NotFound"}
            })
        );
    }

    #[test]
    fn omits_absent_fields_but_keeps_empty_tags() {
        let mut span = model();
        span.parent_id = None;
        span.kind = Kind::Undetermined;
        span.annotations = None;
        span.duration = TimeDelta::zero();
        span.tags.clear();
        let out = encode_one(span);
        let obj = out.as_object().unwrap();
        for key in ["parentId", "kind", "annotations", "duration", "debug", "shared"] {
            assert!(!obj.contains_key(key), "{key} should be omitted");
        }
        assert_eq!(obj["tags"], json!({}));
    }

    #[test]
    fn empty_annotation_list_stays_present() {
        let mut span = model();
        span.annotations = Some(vec![]);
        assert_eq!(encode_one(span)["annotations"], json!([]));
    }

    #[test]
    fn encodes_endpoints_when_present() {
        let mut span = model();
        span.local_endpoint = Some(Endpoint {
            service_name: "api".into(),
            ipv4: Some(Ipv4Addr::new(10, 0, 0, 1)),
            ipv6: None,
            port: 8080,
        });
        assert_eq!(
            encode_one(span)["localEndpoint"],
            json!({"serviceName": "api", "ipv4": "10.0.0.1", "port": 8080})
        );
    }

    #[test]
    fn pretty_output_is_multiline() {
        let raw = encode_json(&[model()], true).unwrap();
        assert!(raw.contains('\n'));
        assert_eq!(encode_json(&[], false).unwrap(), "[]");
    }
}
