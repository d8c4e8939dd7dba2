use serde::Serialize;
use serde_json::{Map, Value};

/// One event as handed over by the upstream buffering engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub tag: String,
    /// Event time as unix seconds
    pub time: i64,
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(tag: impl Into<String>, time: i64, fields: Map<String, Value>) -> Self {
        Self {
            tag: tag.into(),
            time,
            fields,
        }
    }
}

/// The record shape actually sent: the bare field map, or a sequence carrying
/// tag and/or time ahead of the fields.
///
/// Serializes as its content alone, so a `Fields` record encodes as a map and
/// a `Sequence` record as an array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectedRecord {
    Fields(Map<String, Value>),
    Sequence(Vec<Value>),
}

/// Projects a raw record into its outgoing form.
///
/// Pure and infallible: with both flags off the fields pass through alone;
/// otherwise tag (if included), then time (if included), then the fields last.
pub fn project(record: &RawRecord, include_tag: bool, include_time: bool) -> ProjectedRecord {
    if !include_tag && !include_time {
        return ProjectedRecord::Fields(record.fields.clone());
    }

    let mut sequence = Vec::with_capacity(3);
    if include_tag {
        sequence.push(Value::String(record.tag.clone()));
    }
    if include_time {
        sequence.push(Value::from(record.time));
    }
    sequence.push(Value::Object(record.fields.clone()));
    ProjectedRecord::Sequence(sequence)
}
