//! Strongly-typed identifiers handed out by the broker.
//!
//! These prevent mixing up order ids, alert ids and scrip tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(BrokerOrderId, "Broker's identifier for a placed order.");
define_id!(
    AlertId,
    "Broker's identifier for a contingent (GTT/OCO) alert linked to an order."
);
define_id!(ScripToken, "Exchange token of a tradable scrip.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_order_id_new_and_display() {
        let id = BrokerOrderId::new("24011500001234");
        assert_eq!(id.as_str(), "24011500001234");
        assert_eq!(format!("{id}"), "24011500001234");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(AlertId::generate(), AlertId::generate());
    }

    #[test]
    fn serde_is_transparent() {
        let token = ScripToken::from("43650");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"43650\"");

        let parsed: ScripToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }
}
