use std::collections::BTreeMap;

use otzip_core::model::span::{AttrValue, SpanRecord};
use tracing::trace;

pub const STATUS_CODE_TAG: &str = "ot.status_code";
pub const STATUS_DESCRIPTION_TAG: &str = "ot.status_description";
pub const ERROR_TAG: &str = "error";

/// Builds the tag map: attributes first, then status.
///
/// The backend treats the mere presence of an `error` tag as a failure, so
/// an attribute `error = "false"` is dropped. Any other `error` value is
/// forwarded unchanged. A repeated attribute key keeps its first value.
/// Status tags are written last and replace attributes of the same name.
pub fn to_zipkin_tags(record: &SpanRecord) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for kv in &record.attributes {
        tags.entry(kv.key.clone())
            .or_insert_with(|| attr_value_to_string(&kv.value));
    }

    if tags.get(ERROR_TAG).is_some_and(|v| v == "false") {
        tags.remove(ERROR_TAG);
        trace!(span = %record.span_id, "dropped error=false tag");
    }

    tags.insert(
        STATUS_CODE_TAG.to_string(),
        record.status_code.as_str().to_string(),
    );
    if !record.status_message.is_empty() {
        tags.insert(
            STATUS_DESCRIPTION_TAG.to_string(),
            record.status_message.clone(),
        );
    }
    tags
}

pub fn attr_value_to_string(value: &AttrValue) -> String {
    match value {
        AttrValue::String(s) => s.clone(),
        AttrValue::I64(i) => i.to_string(),
        AttrValue::U64(u) => u.to_string(),
        AttrValue::F64(f) => float_to_string(*f),
        AttrValue::Bool(b) => b.to_string(),
    }
}

/// Shortest round-trip digits, in exponent form outside `[1e-4, 1e21)`.
fn float_to_string(f: f64) -> String {
    let magnitude = f.abs();
    if f.is_finite() && magnitude != 0.0 && !(1e-4..1e21).contains(&magnitude) {
        format!("{f:e}")
    } else {
        f.to_string()
    }
}
