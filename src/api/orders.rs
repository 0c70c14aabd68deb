//! Purchase orders.

// self
use crate::{
	_prelude::*,
	api::decimal,
	client::ApiClient,
	envelope::{Envelope, ResponseShape},
	error::TransportError,
	http::HttpTransport,
};

/// Collection endpoint for orders.
pub const ORDERS_PATH: &str = "orders/";
/// Order lists are paginated: `data.results`.
pub const ORDER_LIST_SHAPE: ResponseShape = ResponseShape::Results;

/// Lifecycle states of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Placed, awaiting the seller.
	Pending,
	/// Accepted by the seller.
	Confirmed,
	/// Handed to the carrier.
	Shipped,
	/// Received by the buyer.
	Delivered,
	/// Withdrawn by either party.
	Cancelled,
}
impl OrderStatus {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Confirmed => "confirmed",
			Self::Shipped => "shipped",
			Self::Delivered => "delivered",
			Self::Cancelled => "cancelled",
		}
	}
}
impl Display for OrderStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Purchase order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Server-side identifier.
	pub id: u64,
	/// Ordered product.
	pub product: u64,
	/// Ordered quantity.
	#[serde(deserialize_with = "decimal")]
	pub quantity: f64,
	/// Total price; absent on drafts.
	#[serde(default, deserialize_with = "optional_decimal")]
	pub total_price: Option<f64>,
	/// Current state.
	pub status: OrderStatus,
}

#[derive(Serialize)]
struct StatusChange {
	status: OrderStatus,
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Orders visible to the signed-in user.
	pub async fn list_orders(&self) -> Result<Envelope, TransportError> {
		self.get(ORDERS_PATH).await
	}

	/// [`list_orders`](Self::list_orders) decoded from the paginated `results`.
	pub async fn fetch_orders(&self) -> Result<Vec<Order>> {
		Ok(self.list_orders().await?.decode(ORDER_LIST_SHAPE)?)
	}

	/// Single order.
	pub async fn get_order(&self, id: u64) -> Result<Envelope, TransportError> {
		self.get(&order_path(id)).await
	}

	/// [`get_order`](Self::get_order) decoded into an [`Order`].
	pub async fn fetch_order(&self, id: u64) -> Result<Order> {
		Ok(self.get_order(id).await?.decode(ResponseShape::Object)?)
	}

	/// Places an order.
	pub async fn create_order<B>(&self, order: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.post(ORDERS_PATH, order).await
	}

	/// Moves an order to `status`.
	pub async fn update_order_status(
		&self,
		id: u64,
		status: OrderStatus,
	) -> Result<Envelope, TransportError> {
		self.patch(&order_path(id), &StatusChange { status }).await
	}
}

fn order_path(id: u64) -> String {
	format!("{ORDERS_PATH}{id}/")
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	#[derive(Deserialize)]
	struct Wrapped(#[serde(deserialize_with = "decimal")] f64);

	Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(value)| value))
}
