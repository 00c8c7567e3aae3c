use otzip_core::model::span::{AttrValue, KeyValue, SpanEvent};
use otzip_core::model::zipkin::Annotation;

/// One annotation per event, in event order. No events means no field at
/// all, not an empty list.
pub fn to_zipkin_annotations(events: &[SpanEvent]) -> Option<Vec<Annotation>> {
    if events.is_empty() {
        return None;
    }
    Some(
        events
            .iter()
            .map(|event| Annotation {
                timestamp: event.time,
                value: annotation_value(event),
            })
            .collect(),
    )
}

fn annotation_value(event: &SpanEvent) -> String {
    if event.attributes.is_empty() {
        return event.name.clone();
    }
    format!("{}: {}", event.name, attributes_json(&event.attributes))
}

/// JSON object of attributes in their original order. A repeated key stays
/// where it first appeared and takes the last value. Rendering a `Value`
/// cannot fail.
fn attributes_json(attrs: &[KeyValue]) -> serde_json::Value {
    let mut map = serde_json::Map::with_capacity(attrs.len());
    for kv in attrs {
        map.insert(kv.key.clone(), attr_to_json(&kv.value));
    }
    serde_json::Value::Object(map)
}

fn attr_to_json(value: &AttrValue) -> serde_json::Value {
    match value {
        AttrValue::Bool(b) => serde_json::Value::Bool(*b),
        AttrValue::U64(u) => serde_json::Value::from(*u),
        AttrValue::I64(i) => serde_json::Value::from(*i),
        // Non-finite floats become null.
        AttrValue::F64(f) => serde_json::Value::from(*f),
        AttrValue::String(s) => serde_json::Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn event(name: &str, attributes: Vec<KeyValue>) -> SpanEvent {
        SpanEvent {
            time: Utc.with_ymd_and_hms(2020, 3, 11, 19, 24, 30).unwrap(),
            name: name.into(),
            attributes,
        }
    }

    #[test]
    fn event_with_attributes_gets_json_suffix() {
        let out =
            to_zipkin_annotations(&[event("ev1", vec![KeyValue::new("eventattr1", 123u64)])])
                .unwrap();
        assert_eq!(out[0].value, r#"ev1: {"eventattr1":123}"#);
        assert_eq!(
            out[0].timestamp,
            Utc.with_ymd_and_hms(2020, 3, 11, 19, 24, 30).unwrap()
        );
    }

    #[test]
    fn event_without_attributes_is_bare_name() {
        let out = to_zipkin_annotations(&[event("ev2", vec![])]).unwrap();
        assert_eq!(out[0].value, "ev2");
    }

    #[test]
    fn no_events_means_absent() {
        assert_eq!(to_zipkin_annotations(&[]), None);
    }

    #[test]
    fn keys_keep_insertion_order_and_native_types() {
        let out = to_zipkin_annotations(&[event(
            "retry",
            vec![
                KeyValue::new("zeta", "z"),
                KeyValue::new("alpha", -7i64),
                KeyValue::new("ok", false),
                KeyValue::new("ratio", 0.25f64),
            ],
        )])
        .unwrap();
        assert_eq!(
            out[0].value,
            r#"retry: {"zeta":"z","alpha":-7,"ok":false,"ratio":0.25}"#
        );
    }

    #[test]
    fn repeated_key_keeps_first_position_last_value() {
        let out = to_zipkin_annotations(&[event(
            "ev",
            vec![
                KeyValue::new("a", 1u64),
                KeyValue::new("b", 2u64),
                KeyValue::new("a", 3u64),
            ],
        )])
        .unwrap();
        assert_eq!(out[0].value, r#"ev: {"a":3,"b":2}"#);
    }

    #[test]
    fn non_finite_float_becomes_null() {
        let out =
            to_zipkin_annotations(&[event("ev", vec![KeyValue::new("x", f64::NAN)])]).unwrap();
        assert_eq!(out[0].value, r#"ev: {"x":null}"#);
    }

    #[test]
    fn preserves_event_order() {
        let out = to_zipkin_annotations(&[event("first", vec![]), event("second", vec![])])
            .unwrap();
        let names: Vec<_> = out.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }
}
