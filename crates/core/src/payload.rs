//! Shared, read-only payload handed to every hook

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// The event being validated (for example a file edit), shared by all hooks
///
/// Cloning is cheap: every hook gets its own handle onto the same immutable
/// JSON value, and there is no way to mutate it once dispatched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Arc<Value>);

impl Payload {
    /// Wrap a JSON value
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// An empty (`null`) payload
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// Borrow the underlying JSON value
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Serialize the payload for an external invocation's stdin
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self.value())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_the_same_value() {
        let payload = Payload::new(json!({"file_path": "src/main.rs"}));
        let view = payload.clone();
        assert!(Arc::ptr_eq(&payload.0, &view.0));
        assert_eq!(view.value()["file_path"], "src/main.rs");
    }

    #[test]
    fn test_default_is_null() {
        assert_eq!(Payload::null().value(), &Value::Null);
        assert_eq!(Payload::null().to_bytes().unwrap(), b"null");
    }
}
