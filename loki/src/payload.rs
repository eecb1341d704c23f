//! Loki push API payload

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tags::TagSet;

/// Body of `POST /loki/api/v1/push`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    pub streams: Vec<LogStream>,
}

/// One labelled stream with its timestamped lines
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStream {
    pub stream: BTreeMap<String, String>,
    /// `[unix_nanos_as_string, line]` pairs
    pub values: Vec<[String; 2]>,
}

impl PushRequest {
    /// Single-line request stamped with the current time
    pub fn single(tags: &TagSet, line: impl Into<String>) -> Self {
        Self::single_at(tags, unix_nanos(), line)
    }

    pub fn single_at(tags: &TagSet, timestamp_ns: i64, line: impl Into<String>) -> Self {
        Self {
            streams: vec![LogStream {
                stream: tags.to_labels(),
                values: vec![[timestamp_ns.to_string(), line.into()]],
            }],
        }
    }
}

/// Current wall-clock time in nanoseconds since the Unix epoch
pub fn unix_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000))
}
