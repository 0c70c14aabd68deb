//! Typed decoders that locate an endpoint's payload by its declared shape.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, envelope::Failure};

/// Where an endpoint's payload lives inside the normalized `data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseShape {
	/// `data` is the object itself.
	Object,
	/// `data` is a JSON array.
	Array,
	/// Paginated list: `data.results`.
	Results,
	/// Doubly wrapped paginated list: `data.data.results`.
	NestedResults,
}
impl ResponseShape {
	/// Returns a stable label used in error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Object => "object",
			Self::Array => "array",
			Self::Results => "data.results",
			Self::NestedResults => "data.data.results",
		}
	}

	/// Locates the payload inside `data` and deserializes it into `T`.
	pub fn decode<T>(self, data: Value) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let payload = self.locate(data)?;

		serde_path_to_error::deserialize(payload).map_err(|source| DecodeError::Payload { source })
	}

	fn locate(self, data: Value) -> Result<Value, DecodeError> {
		match self {
			Self::Object => expect_kind(self, data, Value::is_object),
			Self::Array => expect_kind(self, data, Value::is_array),
			Self::Results => {
				let results = take_field(self, data, "results")?;

				expect_kind(self, results, Value::is_array)
			},
			Self::NestedResults => {
				let inner = take_field(self, data, "data")?;
				let results = take_field(self, inner, "results")?;

				expect_kind(self, results, Value::is_array)
			},
		}
	}
}
impl Display for ResponseShape {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure to turn an [`Envelope`](crate::envelope::Envelope) into a typed value.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// The envelope was an `Err`; there is no payload to decode.
	#[error("Request was rejected: {0}")]
	Rejected(#[source] Failure),
	/// The payload is not where the declared shape says it is.
	#[error("Expected payload shape `{expected}` but found {found}.")]
	ShapeMismatch {
		/// Declared shape.
		expected: ResponseShape,
		/// JSON type (or missing key) actually encountered.
		found: String,
	},
	/// The payload was located but does not match the target type.
	#[error("Payload does not match the expected type at `{}`.", source.path())]
	Payload {
		/// Structured parsing failure carrying the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl DecodeError {
	/// Failure carried by a rejected envelope.
	pub fn failure(&self) -> Option<&Failure> {
		match self {
			Self::Rejected(failure) => Some(failure),
			_ => None,
		}
	}
}

fn take_field(shape: ResponseShape, data: Value, key: &str) -> Result<Value, DecodeError> {
	match data {
		Value::Object(mut map) => map.remove(key).ok_or_else(|| DecodeError::ShapeMismatch {
			expected: shape,
			found: format!("no `{key}` key"),
		}),
		other =>
			Err(DecodeError::ShapeMismatch { expected: shape, found: type_name(&other).into() }),
	}
}

fn expect_kind(
	shape: ResponseShape,
	value: Value,
	check: fn(&Value) -> bool,
) -> Result<Value, DecodeError> {
	if check(&value) {
		Ok(value)
	} else {
		Err(DecodeError::ShapeMismatch { expected: shape, found: type_name(&value).into() })
	}
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::envelope::{Envelope, FailureKind};

	#[derive(Debug, PartialEq, Deserialize)]
	struct Product {
		id: u64,
		name: String,
		price: f64,
	}

	#[test]
	fn results_shape_unwraps_pagination() {
		let data = json!({"count": 1, "results": [{"id": 1, "name": "Maize", "price": 12.5}]});
		let products: Vec<Product> =
			ResponseShape::Results.decode(data).expect("Paginated payload should decode.");

		assert_eq!(products, vec![Product { id: 1, name: "Maize".into(), price: 12.5 }]);
	}

	#[test]
	fn nested_results_require_both_levels() {
		let data = json!({"data": {"count": 0}});
		let err = ResponseShape::NestedResults
			.decode::<Vec<Product>>(data)
			.expect_err("Missing results must fail.");

		assert!(matches!(
			err,
			DecodeError::ShapeMismatch { expected: ResponseShape::NestedResults, ref found }
				if found == "no `results` key"
		));
	}

	#[test]
	fn array_shape_rejects_objects() {
		let err = ResponseShape::Array
			.decode::<Vec<Product>>(json!({"results": []}))
			.expect_err("An object is not an array.");

		assert_eq!(err.to_string(), "Expected payload shape `array` but found an object.");
	}

	#[test]
	fn payload_errors_carry_the_json_path() {
		let data = json!([
			{"id": 1, "name": "Maize", "price": 1.0},
			{"id": 2, "name": "Beans", "price": "cheap"},
		]);
		let err = ResponseShape::Array
			.decode::<Vec<Product>>(data)
			.expect_err("The second product has a textual price.");

		match err {
			DecodeError::Payload { source } => assert_eq!(source.path().to_string(), "[1].price"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn rejected_envelopes_surface_their_failure() {
		let envelope =
			Envelope::Err(Failure::new(FailureKind::Forbidden, "No access").with_status(403));
		let err =
			envelope.decode::<Product>(ResponseShape::Object).expect_err("Err cannot decode.");

		assert_eq!(err.failure().map(|f| f.kind), Some(FailureKind::Forbidden));
	}
}
