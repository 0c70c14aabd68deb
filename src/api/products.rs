//! Marketplace listings.

// self
use crate::{
	_prelude::*,
	api::decimal,
	client::ApiClient,
	envelope::{Envelope, ResponseShape},
	error::TransportError,
	http::HttpTransport,
	request::RequestDescriptor,
};

/// Collection endpoint for products.
pub const PRODUCTS_PATH: &str = "products/";
/// Product lists are paginated: `data.results`.
pub const PRODUCT_LIST_SHAPE: ResponseShape = ResponseShape::Results;

/// Product listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
	/// Server-side identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Free-form description.
	#[serde(default)]
	pub description: String,
	/// Category slug.
	#[serde(default)]
	pub category: Option<String>,
	/// Unit price.
	#[serde(deserialize_with = "decimal")]
	pub price: f64,
	/// Quantity on offer.
	#[serde(default, deserialize_with = "decimal")]
	pub quantity: f64,
	/// Unit the quantity and price refer to (`kg`, `bag`, ...).
	#[serde(default)]
	pub unit: Option<String>,
}

/// Filters accepted by [`ApiClient::list_products`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
	/// Free-text search.
	pub search: Option<String>,
	/// Category slug.
	pub category: Option<String>,
	/// 1-based page number.
	pub page: Option<u32>,
}
impl ProductFilter {
	fn apply(&self, mut descriptor: RequestDescriptor) -> RequestDescriptor {
		if let Some(search) = &self.search {
			descriptor = descriptor.with_query("search", search);
		}
		if let Some(category) = &self.category {
			descriptor = descriptor.with_query("category", category);
		}
		if let Some(page) = self.page {
			descriptor = descriptor.with_query("page", page);
		}

		descriptor
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// One page of products matching `filter`.
	pub async fn list_products(&self, filter: &ProductFilter) -> Result<Envelope, TransportError> {
		self.send(&filter.apply(RequestDescriptor::get(PRODUCTS_PATH))).await
	}

	/// [`list_products`](Self::list_products) decoded from the paginated `results`.
	pub async fn fetch_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
		Ok(self.list_products(filter).await?.decode(PRODUCT_LIST_SHAPE)?)
	}

	/// Single product.
	pub async fn get_product(&self, id: u64) -> Result<Envelope, TransportError> {
		self.get(&product_path(id)).await
	}

	/// [`get_product`](Self::get_product) decoded into a [`Product`].
	pub async fn fetch_product(&self, id: u64) -> Result<Product> {
		Ok(self.get_product(id).await?.decode(ResponseShape::Object)?)
	}

	/// Creates a listing.
	pub async fn create_product<B>(&self, product: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.post(PRODUCTS_PATH, product).await
	}

	/// Partially updates a listing.
	pub async fn update_product<B>(&self, id: u64, changes: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.patch(&product_path(id), changes).await
	}

	/// Removes a listing; a `204` yields `Ok{data: null}`.
	pub async fn delete_product(&self, id: u64) -> Result<Envelope, TransportError> {
		self.delete(&product_path(id)).await
	}
}

fn product_path(id: u64) -> String {
	format!("{PRODUCTS_PATH}{id}/")
}
