//! Newtype IDs for type-safe entity references.
//!
//! The storefront API identifies products and orders with opaque strings.
//! Use the `define_id!` macro to wrap them so a product ID can never be
//! passed where an order ID is expected.

/// Declare a `String` newtype that serialises as the bare string and
/// displays as itself.
///
/// # Example
///
/// ```rust
/// # use web_larek_core::define_id;
/// define_id!(SkuId);
/// define_id!(InvoiceId);
///
/// let sku = SkuId::new("854cef69");
/// let invoice = InvoiceId::new("854cef69");
///
/// assert_eq!(sku.as_str(), invoice.as_str());
/// // These are different types, so this won't compile:
/// // let _: SkuId = invoice;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);
