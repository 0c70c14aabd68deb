//! Storage slots distinguished by persistence policy.

// self
use crate::_prelude::*;

/// Fixed key the credential is stored under in every slot.
pub const CREDENTIAL_KEY: &str = "authToken";

/// Storage slot a credential is written to.
///
/// At most one slot holds a live value by convention; readers check [`Slot::Durable`] first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
	/// Survives application restarts ("remember me").
	Durable,
	/// Lives only as long as the current process.
	Session,
}
impl Slot {
	/// Slots in resolution order.
	pub const RESOLUTION_ORDER: [Slot; 2] = [Slot::Durable, Slot::Session];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Slot::Durable => "durable",
			Slot::Session => "session",
		}
	}

	/// Returns the opposite slot.
	pub const fn other(self) -> Self {
		match self {
			Slot::Durable => Slot::Session,
			Slot::Session => Slot::Durable,
		}
	}
}
impl Display for Slot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
