use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{OtzipError, Result};

/// 128-bit trace identifier as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceId([u8; 16]);

/// 64-bit span identifier as raw bytes. All zeros means "no span".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanId([u8; 8]);

impl TraceId {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; 16] = bytes.try_into().map_err(|_| {
            OtzipError::Parse(format!("trace id must be 16 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(raw))
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut raw = [0u8; 16];
        decode_hex(input, &mut raw)
            .ok_or_else(|| OtzipError::Parse(format!("invalid trace id: {input}")))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

impl SpanId {
    pub const ZERO: SpanId = SpanId([0; 8]);

    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Empty input is accepted as [`SpanId::ZERO`]; OTLP leaves the parent
    /// field empty on root spans.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::ZERO);
        }
        let raw: [u8; 8] = bytes.try_into().map_err(|_| {
            OtzipError::Parse(format!("span id must be 8 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(raw))
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut raw = [0u8; 8];
        decode_hex(input, &mut raw)
            .ok_or_else(|| OtzipError::Parse(format!("invalid span id: {input}")))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 8]
    }

    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TraceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TraceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for SpanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SpanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

fn decode_hex(input: &str, out: &mut [u8]) -> Option<()> {
    if input.len() != out.len() * 2 || !input.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&input[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(())
}
