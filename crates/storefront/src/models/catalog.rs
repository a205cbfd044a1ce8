//! Catalog and coupon records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rahat_core::{CategoryId, CouponId, DiscountType, Language, Money, ProductId};

use super::flexible_bool;

// =============================================================================
// Categories
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub en_name: String,
    #[serde(default)]
    pub fa_name: String,
    #[serde(default)]
    pub en_description: Option<String>,
    #[serde(default)]
    pub fa_description: Option<String>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub slug: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: bool,
}

impl ProductCategory {
    /// Category name in `language`, falling back to English.
    #[must_use]
    pub fn name(&self, language: Language) -> &str {
        localized(&self.en_name, &self.fa_name, language)
    }

    /// Whether products in this category ship physically.
    ///
    /// Merchandise categories are identified by slug; everything else is
    /// delivered digitally (game credits, gems, recharge).
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.slug.contains("merch") || self.slug.contains("physical")
    }
}

// =============================================================================
// Products
// =============================================================================

/// A catalog product. All prices are USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub en_name: String,
    #[serde(default)]
    pub fa_name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub en_description: String,
    #[serde(default)]
    pub fa_description: String,
    pub price: Money,
    /// Advertised discount percentage, if any.
    #[serde(default)]
    pub discount: Option<Decimal>,
    pub slug: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: bool,
    pub product_category_id: CategoryId,
    #[serde(default)]
    pub product_category: Option<ProductCategory>,
}

impl Product {
    /// Product name in `language`, falling back to English.
    #[must_use]
    pub fn name(&self, language: Language) -> &str {
        localized(&self.en_name, &self.fa_name, language)
    }

    /// Product description in `language`, falling back to English.
    #[must_use]
    pub fn description(&self, language: Language) -> &str {
        localized(&self.en_description, &self.fa_description, language)
    }

    /// The discount percentage when it is strictly positive.
    #[must_use]
    pub fn discount_percent(&self) -> Option<Decimal> {
        self.discount.filter(|d| *d > Decimal::ZERO)
    }

    /// Price after the advertised discount, for display badges.
    ///
    /// Checkout charges [`Product::price`]; the discount is informational.
    #[must_use]
    pub fn sale_price(&self) -> Money {
        self.discount_percent().map_or(self.price, |percent| {
            self.price.saturating_sub(self.price.percent(percent))
        })
    }

    /// Whether the product ships physically, judged by its embedded category.
    ///
    /// Returns `None` when the category relation was not included.
    #[must_use]
    pub fn is_physical(&self) -> Option<bool> {
        self.product_category
            .as_ref()
            .map(ProductCategory::is_physical)
    }
}

fn localized<'a>(en: &'a str, fa: &'a str, language: Language) -> &'a str {
    match language {
        Language::Fa if !fa.is_empty() => fa,
        _ => en,
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// A coupon resolved by `POST /coupon/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    #[serde(rename = "discountType", alias = "discount_type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            en_name: format!("Product {id}"),
            fa_name: String::new(),
            thumbnail: None,
            media: Vec::new(),
            en_description: String::new(),
            fa_description: String::new(),
            price: Money::usd(price.parse().unwrap()),
            discount: None,
            slug: format!("product-{id}"),
            is_featured: false,
            is_active: true,
            product_category_id: CategoryId::new(1),
            product_category: None,
        }
    }

    pub(crate) fn category(id: i64, slug: &str) -> ProductCategory {
        ProductCategory {
            id: CategoryId::new(id),
            en_name: slug.to_string(),
            fa_name: String::new(),
            en_description: None,
            fa_description: None,
            media: Vec::new(),
            thumbnail: None,
            slug: slug.to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_product_decodes_backend_shape() {
        let body = r#"{
            "id": 2, "en_name": "PUBG Mobile 600 UC", "fa_name": "پابجی",
            "thumbnail": "products/pubg.png", "en_description": "Top up",
            "fa_description": "", "price": "9.99", "discount": 0,
            "slug": "pubg-mobile-600-uc", "is_featured": 0, "is_active": 1,
            "product_category_id": 1
        }"#;
        let product: Product = serde_json::from_str(body).unwrap();
        assert_eq!(product.price, Money::usd(Decimal::new(999, 2)));
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert_eq!(product.discount_percent(), None);
        assert_eq!(product.name(Language::Fa), "پابجی");
        assert_eq!(product.description(Language::Fa), "Top up");
    }

    #[test]
    fn test_sale_price() {
        let mut p = product(4, "20.00");
        assert_eq!(p.sale_price(), Money::usd(Decimal::new(20, 0)));
        p.discount = Some(Decimal::new(5, 0));
        assert_eq!(p.sale_price(), Money::usd(Decimal::new(19, 0)));
    }

    #[test]
    fn test_physical_classification() {
        assert!(category(3, "gaming-merch").is_physical());
        assert!(category(9, "physical-goods").is_physical());
        assert!(!category(1, "pubg-mobile").is_physical());

        let mut p = product(5, "24.99");
        assert_eq!(p.is_physical(), None);
        p.product_category = Some(category(3, "gaming-merch"));
        assert_eq!(p.is_physical(), Some(true));
    }

    #[test]
    fn test_coupon_accepts_both_casings() {
        let a: Coupon =
            serde_json::from_str(r#"{"id":1,"code":"RAHAT10","discountType":"PERCENTAGE","value":10}"#)
                .unwrap();
        let b: Coupon =
            serde_json::from_str(r#"{"id":1,"code":"RAHAT10","discount_type":"PERCENTAGE","value":"10"}"#)
                .unwrap();
        assert_eq!(a, b);
    }
}
