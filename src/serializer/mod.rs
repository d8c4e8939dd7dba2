use thiserror::Error;

use crate::record::ProjectedRecord;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("MessagePack encoding failed: {0}")]
    Msgpack(#[from] rmp_serde::encode::Error),
}

/// Fixed registry of batch serializers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerChoice {
    Json,
    Msgpack,
}

impl SerializerChoice {
    /// Looks a serializer up by its configured name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(Self::Json),
            "msgpack" => Some(Self::Msgpack),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Msgpack => "msgpack",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Msgpack => "application/x-msgpack; charset=x-user-defined",
        }
    }
}

impl std::fmt::Display for SerializerChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoded batch body plus the content type it must be sent with.
#[derive(Debug, Clone)]
pub struct Payload {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// Encodes a projected batch with the chosen serializer.
///
/// Lossless for strings, numbers, booleans, nested maps/sequences and null;
/// fails only on values the chosen encoding cannot represent.
pub fn encode(
    choice: SerializerChoice,
    batch: &[ProjectedRecord],
) -> Result<Payload, SerializationError> {
    let body = match choice {
        SerializerChoice::Json => serde_json::to_vec(batch)?,
        SerializerChoice::Msgpack => rmp_serde::to_vec(batch)?,
    };

    Ok(Payload {
        body,
        content_type: choice.content_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawRecord, project};
    use serde_json::{Value, json};

    fn fields_of(value: Value) -> serde_json::Map<String, Value> {
        let Value::Object(fields) = value else {
            panic!("expected an object");
        };
        fields
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(SerializerChoice::from_name("json"), Some(SerializerChoice::Json));
        assert_eq!(SerializerChoice::from_name("msgpack"), Some(SerializerChoice::Msgpack));
        assert_eq!(SerializerChoice::from_name("protobuf"), None);
    }

    #[test]
    fn json_batch_without_flags_is_array_of_objects() {
        let record = RawRecord::new("t", 0, fields_of(json!({"msg": "message"})));
        let batch = vec![project(&record, false, false)];

        let payload = encode(SerializerChoice::Json, &batch).unwrap();
        assert_eq!(payload.content_type, "application/json");

        let decoded: Value = serde_json::from_slice(&payload.body).unwrap();
        assert_eq!(decoded, json!([{"msg": "message"}]));
    }

    #[test]
    fn json_batch_with_flags_is_array_of_sequences() {
        let record = RawRecord::new("app.log", 1_293_941_655, fields_of(json!({"f1": 10})));
        let batch = vec![project(&record, true, true)];

        let payload = encode(SerializerChoice::Json, &batch).unwrap();
        let decoded: Value = serde_json::from_slice(&payload.body).unwrap();
        assert_eq!(decoded, json!([["app.log", 1_293_941_655, {"f1": 10}]]));
    }

    #[test]
    fn msgpack_round_trip_preserves_values() {
        let fields = fields_of(json!({
            "string": "text",
            "int": -42,
            "float": 1.5,
            "bool": true,
            "null": null,
            "nested": {"list": [1, 2, 3]}
        }));
        let record = RawRecord::new("app.log", 1_293_941_655, fields);
        let batch = vec![project(&record, true, true)];

        let payload = encode(SerializerChoice::Msgpack, &batch).unwrap();
        assert_eq!(
            payload.content_type,
            "application/x-msgpack; charset=x-user-defined"
        );

        let decoded: Value = rmp_serde::from_slice(&payload.body).unwrap();
        assert_eq!(
            decoded,
            json!([["app.log", 1_293_941_655, {
                "string": "text",
                "int": -42,
                "float": 1.5,
                "bool": true,
                "null": null,
                "nested": {"list": [1, 2, 3]}
            }]])
        );
    }

    #[test]
    fn batch_order_is_preserved() {
        let first = RawRecord::new("a", 1, fields_of(json!({"n": 1})));
        let second = RawRecord::new("b", 2, fields_of(json!({"n": 2})));
        let batch = vec![project(&first, false, false), project(&second, false, false)];

        let payload = encode(SerializerChoice::Json, &batch).unwrap();
        let decoded: Value = serde_json::from_slice(&payload.body).unwrap();
        assert_eq!(decoded, json!([{"n": 1}, {"n": 2}]));
    }
}
