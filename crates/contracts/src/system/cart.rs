//! Shopping cart line items as persisted on the client.
//!
//! Field names follow the JSON already stored by the storefront
//! (`productId`, `variantName`, ...), so existing carts keep loading.

use serde::{Deserialize, Serialize};

/// One line of the cart. Exactly one line per `id`, `qty >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    /// Unit price captured when the item was added. Never re-priced.
    pub price: f64,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

/// Input for adding to the cart: a cart line without a quantity.
///
/// `id`, `name` and `price` are required; every optional field starts as
/// `None` and is set through the `with_*` builders.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub sku: Option<String>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
    pub attrs_text: Option<String>,
    pub original_price: Option<f64>,
}

impl NewCartItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            sku: None,
            product_id: None,
            variant_id: None,
            variant_name: None,
            attrs_text: None,
            original_price: None,
        }
    }

    /// Stored as given, an empty URL included.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    /// Variant id plus its display name ("50ml", "Rose 02").
    pub fn with_variant(
        mut self,
        variant_id: impl Into<String>,
        variant_name: impl Into<String>,
    ) -> Self {
        self.variant_id = Some(variant_id.into());
        self.variant_name = Some(variant_name.into());
        self
    }

    pub fn with_attrs_text(mut self, attrs_text: impl Into<String>) -> Self {
        self.attrs_text = Some(attrs_text.into());
        self
    }

    /// Price before a flash sale / discount, for strike-through display.
    pub fn with_original_price(mut self, original_price: f64) -> Self {
        self.original_price = Some(original_price);
        self
    }

    /// Checks the required fields. Metadata is carried as-is.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("cart item id is empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("invalid price {} for item {}", self.price, self.id));
        }
        Ok(())
    }

    pub fn into_line(self, qty: u32) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name,
            price: self.price,
            qty,
            image: self.image,
            sku: self.sku,
            product_id: self.product_id,
            variant_id: self.variant_id,
            variant_name: self.variant_name,
            attrs_text: self.attrs_text,
            original_price: self.original_price,
        }
    }
}

/// Total number of units across all lines.
pub fn cart_count(items: &[CartItem]) -> u64 {
    items.iter().map(|i| u64::from(i.qty)).sum()
}

/// Sum of `price * qty`. No rounding.
pub fn cart_total(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_on_empty_cart() {
        assert_eq!(cart_count(&[]), 0);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[test]
    fn test_totals_recomputed_from_lines() {
        let items = vec![
            NewCartItem::new("p1", "Son", 100000.0).into_line(1),
            NewCartItem::new("p2", "Serum", 200000.0).into_line(2),
        ];
        assert_eq!(cart_count(&items), 3);
        assert_eq!(cart_total(&items), 500000.0);
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(NewCartItem::new("p1", "Son", 0.0).validate().is_ok());
        assert!(NewCartItem::new("  ", "Son", 10.0).validate().is_err());
        assert!(NewCartItem::new("p1", "Son", -1.0).validate().is_err());
        assert!(NewCartItem::new("p1", "Son", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let line = NewCartItem::new("v9", "Kem chống nắng", 250000.0)
            .with_product_id("p9")
            .with_variant("v9", "50ml")
            .with_original_price(300000.0)
            .into_line(2);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["productId"], "p9");
        assert_eq!(json["variantName"], "50ml");
        assert_eq!(json["originalPrice"], 300000.0);
        assert!(json.get("image").is_none());
        assert!(json.get("sku").is_none());
    }

    #[test]
    fn test_image_kept_as_given() {
        assert_eq!(NewCartItem::new("p1", "Son", 1.0).image, None);
        let line = NewCartItem::new("p1", "Son", 1.0).with_image("").into_line(1);
        assert_eq!(line.image.as_deref(), Some(""));
        assert_eq!(serde_json::to_value(&line).unwrap()["image"], "");
        assert_eq!(
            NewCartItem::new("p1", "Son", 1.0).with_image("/img/son.png").image.as_deref(),
            Some("/img/son.png")
        );
    }
}
