use serde::{Deserialize, Serialize};

/// Externally assigned product identifier.
pub type ProductId = u64;

/// Catalog record as served by `GET /products/{id}`. Has no quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    #[serde(rename = "image", alias = "imageUrl", default)]
    pub image_url: String,
}

/// A line item in the cart: a catalog record plus the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    #[serde(rename = "image", alias = "imageUrl", default)]
    pub image_url: String,
    pub amount: u32,
}

impl Product {
    /// Creates a line item from a catalog record.
    ///
    /// # Arguments
    /// * `record` - Catalog data for the product
    /// * `amount` - Quantity to put in the cart
    pub fn from_catalog(record: CatalogProduct, amount: u32) -> Self {
        Self {
            id: record.id,
            title: record.title,
            price: record.price,
            image_url: record.image_url,
            amount,
        }
    }
}

impl CatalogProduct {
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: f64,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image_url: image_url.into(),
        }
    }
}
