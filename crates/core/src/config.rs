use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OtzipError, Result};

/// Encoding of a batch handed to the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// JSON array of span records.
    #[default]
    Records,
    /// Protobuf-encoded OTLP `ExportTraceServiceRequest`.
    OtlpProtobuf,
}

impl InputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "records" | "json" => Ok(Self::Records),
            "otlp" | "otlp-protobuf" | "protobuf" => Ok(Self::OtlpProtobuf),
            _ => Err(OtzipError::InvalidArgument(format!(
                "unknown input format: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub input_format: InputFormat,
    pub pretty: bool,
    pub skip_invalid: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default)]
struct ConfigOverrides {
    input_format: Option<String>,
    pretty: Option<String>,
    skip_invalid: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("OTZIP_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("otzip/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| OtzipError::Io(format!("failed reading {}: {e}", path.display())))?;
    parse_file_overrides(&raw)
        .map(Some)
        .map_err(|e| OtzipError::Config(format!("failed parsing {}: {e}", path.display())))
}

/// The file may spell booleans natively (`pretty = true`) or as strings.
fn parse_file_overrides(raw: &str) -> std::result::Result<ConfigOverrides, toml::de::Error> {
    let table: toml::Table = toml::from_str(raw)?;
    let field = |name: &str| {
        table.get(name).map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };
    Ok(ConfigOverrides {
        input_format: field("input_format"),
        pretty: field("pretty"),
        skip_invalid: field("skip_invalid"),
    })
}

fn load_env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        input_format: env::var("OTZIP_INPUT_FORMAT").ok(),
        pretty: env::var("OTZIP_PRETTY").ok(),
        skip_invalid: env::var("OTZIP_SKIP_INVALID").ok(),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.input_format {
        cfg.input_format = InputFormat::parse(&v).map_err(|e| {
            OtzipError::Config(format!("bad input_format in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.pretty {
        cfg.pretty = parse_flag(&v).map_err(|e| {
            OtzipError::Config(format!("bad pretty in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.skip_invalid {
        cfg.skip_invalid = parse_flag(&v).map_err(|e| {
            OtzipError::Config(format!("bad skip_invalid in {source}: {e} (value={v})"))
        })?;
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(OtzipError::Parse("expected a boolean".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reads_records_compactly() {
        let cfg = Config::default();
        assert_eq!(cfg.input_format, InputFormat::Records);
        assert!(!cfg.pretty);
        assert!(!cfg.skip_invalid);
    }

    #[test]
    fn input_format_parse_variants() {
        assert_eq!(InputFormat::parse("json").unwrap(), InputFormat::Records);
        assert_eq!(
            InputFormat::parse("OTLP").unwrap(),
            InputFormat::OtlpProtobuf
        );
        assert_eq!(
            InputFormat::parse("otlp-protobuf").unwrap(),
            InputFormat::OtlpProtobuf
        );
        assert!(InputFormat::parse("thrift").is_err());
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert!(parse_flag("yes").unwrap());
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn file_overrides_accept_native_and_string_values() {
        let overrides =
            parse_file_overrides("input_format = \"otlp\"\npretty = true\nskip_invalid = \"1\"\n")
                .unwrap();
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, overrides, "config file").unwrap();
        assert_eq!(cfg.input_format, InputFormat::OtlpProtobuf);
        assert!(cfg.pretty);
        assert!(cfg.skip_invalid);
    }

    #[test]
    fn bad_override_names_its_source() {
        let mut cfg = Config::default();
        let err = apply_overrides(
            &mut cfg,
            ConfigOverrides {
                pretty: Some("sometimes".to_string()),
                ..ConfigOverrides::default()
            },
            "environment",
        )
        .unwrap_err();
        assert!(err.to_string().contains("bad pretty in environment"));
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let overrides = load_file_overrides(Path::new("/nonexistent/otzip/config.toml")).unwrap();
        assert!(overrides.is_none());
    }
}
