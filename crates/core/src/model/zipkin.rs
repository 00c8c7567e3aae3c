//! Zipkin v2 span model.
//!
//! Optional fields are `Option` rather than sentinels: the backend tells an
//! omitted field apart from a present-but-empty one.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, TimeDelta, Utc};

/// 128-bit trace id split into big-endian halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ZipkinTraceId {
    pub high: u64,
    pub low: u64,
}

impl ZipkinTraceId {
    /// 16 hex digits when `high` is zero, 32 otherwise.
    pub fn to_hex(&self) -> String {
        if self.high == 0 {
            format!("{:016x}", self.low)
        } else {
            format!("{:016x}{:016x}", self.high, self.low)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// No kind asserted; encoded as the empty token.
    #[default]
    Undetermined,
    Client,
    Server,
    Producer,
    Consumer,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undetermined => "",
            Self::Client => "CLIENT",
            Self::Server => "SERVER",
            Self::Producer => "PRODUCER",
            Self::Consumer => "CONSUMER",
        }
    }
}

/// Network context of a span. The converter never fills these in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub service_name: String,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub timestamp: DateTime<Utc>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanModel {
    pub trace_id: ZipkinTraceId,
    pub id: u64,
    pub parent_id: Option<u64>,
    pub debug: bool,
    pub sampled: Option<bool>,
    pub err: Option<String>,
    pub name: String,
    pub kind: Kind,
    pub timestamp: DateTime<Utc>,
    pub duration: TimeDelta,
    pub shared: bool,
    pub local_endpoint: Option<Endpoint>,
    pub remote_endpoint: Option<Endpoint>,
    pub annotations: Option<Vec<Annotation>>,
    pub tags: BTreeMap<String, String>,
}
