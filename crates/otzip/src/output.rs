use chrono::SecondsFormat;
use otzip_core::model::zipkin::{Kind, SpanModel};
use owo_colors::OwoColorize;

pub fn print_spans_human(spans: &[SpanModel]) {
    for span in spans {
        let parent = span
            .parent_id
            .map(|id| format!("{id:016x}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "SPAN {:016x} trace={} parent={} kind={} name={} duration={}ms",
            span.id,
            span.trace_id.to_hex(),
            parent,
            kind_label(span.kind),
            span.name,
            span.duration.num_milliseconds()
        );
        for annotation in span.annotations.iter().flatten() {
            println!(
                "  @{} {}",
                annotation
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                annotation.value
            );
        }
        for (key, value) in &span.tags {
            if key == "ot.status_code" && value != "OK" {
                println!("  {key}={}", value.red());
            } else {
                println!("  {key}={value}");
            }
        }
    }

    let roots = spans.iter().filter(|s| s.parent_id.is_none()).count();
    println!("-- {} spans ({} roots) --", spans.len(), roots);
}

fn kind_label(kind: Kind) -> String {
    match kind {
        Kind::Server => "SERVER".green().to_string(),
        Kind::Client => "CLIENT".cyan().to_string(),
        Kind::Producer => "PRODUCER".yellow().to_string(),
        Kind::Consumer => "CONSUMER".magenta().to_string(),
        Kind::Undetermined => "-".bright_black().to_string(),
    }
}
