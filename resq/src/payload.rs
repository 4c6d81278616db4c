//! Job payload
//!
//! A payload is the serializable envelope for one unit of work: a JSON object
//! body (conventionally `class` and `args`) plus a tracking uuid.
//!
//! On the wire the uuid travels inside the stored record under the reserved
//! top-level field `uuid`; it is split back out on decode, so `body()` never
//! contains it.

use crate::processor::{JobClass, Registry};
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Reserved record field carrying the uuid
pub const UUID_FIELD: &str = "uuid";

/// Generate a new tracking identifier (32 lowercase hex characters)
pub fn generate_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Stable identifier for a record stored without a `uuid` field
fn record_uuid(record: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, record.as_bytes())
        .simple()
        .to_string()
}

/// Serializable job envelope
#[derive(Clone)]
pub struct Payload {
    uuid: String,
    body: Map<String, Value>,
    class: OnceCell<Arc<JobClass>>,
}

impl Payload {
    /// Create a payload with a freshly generated uuid
    pub fn new(body: Map<String, Value>) -> Self {
        Self::with_uuid(generate_uuid(), body)
    }

    /// Create a payload with a known uuid
    pub fn with_uuid(uuid: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            uuid: uuid.into(),
            body,
            class: OnceCell::new(),
        }
    }

    /// Create a payload from a JSON object body with a fresh uuid
    pub fn from_body(body: Value) -> Result<Self> {
        match body {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(Error::Serialization(format!(
                "payload body must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Build a job body: `{"class": class, "args": args}`
    pub fn job_body(class: &str, args: Vec<Value>) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("class".to_string(), Value::String(class.to_string()));
        body.insert("args".to_string(), Value::Array(args));
        body
    }

    /// Decode a stored record
    ///
    /// Records without a `uuid` field (e.g. written by another producer) get
    /// one derived from the record bytes, so every read of the same record
    /// reports the same identifier.
    pub fn decode(record: &str) -> Result<Self> {
        let mut body = match serde_json::from_str::<Value>(record)? {
            Value::Object(map) => map,
            other => {
                return Err(Error::Serialization(format!(
                    "stored payload is not a JSON object: {}",
                    other
                )))
            }
        };

        match body.remove(UUID_FIELD) {
            Some(Value::String(uuid)) => Ok(Self::with_uuid(uuid, body)),
            _ => {
                tracing::debug!("Stored payload has no uuid, deriving one");
                Ok(Self::with_uuid(record_uuid(record), body))
            }
        }
    }

    /// Encode as a stored record
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    /// Record form: the body plus the `uuid` field
    pub fn to_record(&self) -> Value {
        let mut record = self.body.clone();
        record.insert(UUID_FIELD.to_string(), Value::String(self.uuid.clone()));
        Value::Object(record)
    }

    /// Tracking identifier
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Body without the uuid
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Consume into the body
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }

    /// Field lookup on the body
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// The `class` field
    pub fn class_name(&self) -> Option<&str> {
        self.body.get("class").and_then(Value::as_str)
    }

    /// The `args` field, empty if absent
    pub fn args(&self) -> &[Value] {
        self.body
            .get("args")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve the class through a registry
    ///
    /// The first successful resolution is cached on the payload.
    pub fn resolve_class(&self, registry: &Registry) -> Result<Arc<JobClass>> {
        self.class
            .get_or_try_init(|| {
                let name = self.class_name().ok_or(Error::NoClass)?;
                registry.resolve(name)
            })
            .cloned()
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid && self.body == other.body
    }
}

/// Compares the body only
impl PartialEq<Value> for Payload {
    fn eq(&self, other: &Value) -> bool {
        match other {
            Value::Object(map) => &self.body == map,
            _ => false,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("uuid", &self.uuid)
            .field("body", &self.body)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::HandlerFn;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn is_uuid(s: &str) -> bool {
        s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }

    #[test]
    fn test_uuid_given_or_generated() {
        let payload = Payload::with_uuid("12345", body(json!({"name": "chris"})));
        assert_eq!(payload.uuid(), "12345");
        assert_eq!(payload.get("name"), Some(&json!("chris")));

        let payload = Payload::new(body(json!({"name": "chris"})));
        assert!(is_uuid(payload.uuid()));
        assert_eq!(payload, json!({"name": "chris"}));
    }

    #[test]
    fn test_record_roundtrip_keeps_uuid_out_of_body() {
        let payload = Payload::with_uuid("abc", body(json!({"class": "SomeJob", "args": [20, "/tmp"]})));
        let record = payload.encode().unwrap();

        let decoded = Payload::decode(&record).unwrap();
        assert_eq!(decoded.uuid(), "abc");
        assert!(decoded.body().get(UUID_FIELD).is_none());
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(matches!(Payload::decode("[1,2]"), Err(Error::Serialization(_))));
        assert!(matches!(Payload::decode("not json"), Err(Error::Serialization(_))));
        assert!(Payload::from_body(json!("text")).is_err());
    }

    #[test]
    fn test_decode_without_uuid_derives_stable_one() {
        let record = r#"{"class":"GoodJob"}"#;
        let payload = Payload::decode(record).unwrap();
        assert!(is_uuid(payload.uuid()));
        assert_eq!(payload.class_name(), Some("GoodJob"));
        assert!(payload.args().is_empty());

        assert_eq!(Payload::decode(record).unwrap().uuid(), payload.uuid());
        assert_ne!(
            Payload::decode(r#"{"class":"BadJob"}"#).unwrap().uuid(),
            payload.uuid()
        );
    }

    #[test]
    fn test_class_and_args() {
        let payload = Payload::new(Payload::job_body("SomeJob", vec![json!(20), json!("/tmp")]));
        assert_eq!(payload.class_name(), Some("SomeJob"));
        assert_eq!(payload.args(), &[json!(20), json!("/tmp")]);
    }

    #[test]
    fn test_resolve_class_is_cached() {
        let registry = Registry::from_classes([JobClass::new("SomeJob").perform(HandlerFn::new(
            |_args: Vec<Value>| std::future::ready(Ok::<Value, crate::BoxError>(Value::Null)),
        ))])
        .unwrap();

        let payload = Payload::new(Payload::job_body("some-job", vec![]));
        let first = payload.resolve_class(&registry).unwrap();
        let second = payload.resolve_class(&Registry::new()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let missing = Payload::new(Payload::job_body("Missing", vec![]));
        assert!(matches!(
            missing.resolve_class(&registry),
            Err(Error::ClassResolution(_))
        ));

        let classless = Payload::new(body(json!({"name": "chris"})));
        assert!(matches!(classless.resolve_class(&registry), Err(Error::NoClass)));
    }
}
