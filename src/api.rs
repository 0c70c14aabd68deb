//! Typed endpoint methods layered over [`ApiClient::send`](crate::client::ApiClient::send).
//!
//! Each resource lives in its own module with an `impl ApiClient` block. Methods named after
//! the operation (`list_products`, `update_order_status`, ...) return the raw
//! [`Envelope`](crate::envelope::Envelope); `fetch_*` methods decode the payload with the
//! [`ResponseShape`](crate::envelope::ResponseShape) the endpoint declares and fail with
//! [`Error::Decode`] when it does not match.

pub mod auth;
pub mod dashboards;
pub mod orders;
pub mod products;
pub mod users;

pub use auth::*;
pub use dashboards::*;
pub use orders::*;
pub use products::*;
pub use users::*;

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::_prelude::*;

/// Accepts Django `DecimalField` output (a string) as well as plain JSON numbers.
pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(f64),
		Text(String),
	}

	match Raw::deserialize(deserializer)? {
		Raw::Number(value) => Ok(value),
		Raw::Text(text) => text
			.trim()
			.parse()
			.map_err(|_| D::Error::custom(format!("`{text}` is not a decimal number"))),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Price {
		#[serde(deserialize_with = "decimal")]
		amount: f64,
	}

	#[test]
	fn decimal_accepts_strings_and_numbers() {
		let text: Price = serde_json::from_str(r#"{"amount":"12.50"}"#).expect("String decimal.");
		let number: Price = serde_json::from_str(r#"{"amount":3}"#).expect("Numeric decimal.");

		assert_eq!(text.amount, 12.5);
		assert_eq!(number.amount, 3.0);
		assert!(serde_json::from_str::<Price>(r#"{"amount":"a lot"}"#).is_err());
	}
}
