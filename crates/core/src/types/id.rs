//! Newtype IDs for type-safe entity references.
//!
//! Backend records use integer primary keys, so most ids are defined with
//! `define_id!`. Users and CMS pages are keyed by opaque strings on the wire
//! (the backend may still send a number), which `define_key!` accepts.

use serde::{Deserialize, Deserializer};

/// Macro to define a type-safe integer ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use rahat_core::define_id;
/// define_id!(ProductId);
/// define_id!(WalletId);
///
/// let product_id = ProductId::new(1);
/// let wallet_id = WalletId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = wallet_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a string-keyed ID wrapper.
///
/// Deserializes from either a JSON string or a JSON number, since the backend
/// is not consistent about which one it sends for these keys.
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::string_or_number(deserializer).map(Self)
            }
        }
    };
}

define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderProductId);
define_id!(WalletId);
define_id!(TransactionId);
define_id!(CouponId);
define_id!(BlogPostId);

define_key!(UserId);
define_key!(PageId);
define_key!(TenantId);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Deserialize a key that may arrive as either a string or a number.
///
/// # Errors
///
/// Returns an error if the value is neither a string nor a number.
#[doc(hidden)]
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawKey::deserialize(deserializer)? {
        RawKey::Text(s) => s,
        RawKey::Int(n) => n.to_string(),
        RawKey::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_id_is_transparent() {
        let id: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ProductId::new(42));
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn test_user_id_accepts_string() {
        let id: UserId = serde_json::from_str("\"u_12345\"").unwrap();
        assert_eq!(id.as_str(), "u_12345");
    }

    #[test]
    fn test_user_id_accepts_number() {
        let id: UserId = serde_json::from_str("17").unwrap();
        assert_eq!(id, UserId::new("17"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"17\"");
    }

    #[test]
    fn test_key_rejects_objects() {
        assert!(serde_json::from_str::<PageId>("{}").is_err());
    }
}
