//! Display-ready product summaries built from raw catalog payloads.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::domain::product::{ProductCode, ProductRecord};
use crate::errors::DomainError;
use crate::links::ProductLinks;
use crate::pricing::student_price;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub code: ProductCode,
    pub title: String,
    pub price: Decimal,
    pub discounted_price: Decimal,
    pub stock_level: i64,
    pub purchasable: bool,
    pub links: ProductLinks,
}

impl ProductSummary {
    pub fn from_record(code: ProductCode, record: &ProductRecord, api_base_url: &str) -> Self {
        Self {
            code,
            title: record.name.clone(),
            price: record.price,
            discounted_price: student_price(record.price),
            stock_level: record.stock_level,
            purchasable: record.purchasable,
            links: ProductLinks::new(
                code,
                &record.name,
                record.image_path.as_deref(),
                api_base_url,
            ),
        }
    }

    pub fn from_json(
        code: ProductCode,
        payload: &Value,
        api_base_url: &str,
    ) -> Result<Self, DomainError> {
        let record = ProductRecord::from_json(payload)?;
        Ok(Self::from_record(code, &record, api_base_url))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::ProductSummary;
    use crate::domain::product::ProductCode;
    use crate::errors::DomainError;

    #[test]
    fn summary_carries_both_prices_and_links() {
        let payload = json!({
            "name": "Rose Hand Cream",
            "purchasable": false,
            "images": [{ "url": "/medias/rose.jpg" }],
            "baseOptions": [{ "options": [{
                "priceData": { "value": 10.0 },
                "stock": { "stockLevel": 0 }
            }] }]
        });
        let code = ProductCode::parse(987_654).expect("code");

        let summary =
            ProductSummary::from_json(code, &payload, "https://api.example.test").expect("summary");

        assert_eq!(summary.title, "Rose Hand Cream");
        assert_eq!(summary.price, Decimal::new(10, 0));
        assert_eq!(summary.discounted_price, Decimal::new(9, 0));
        assert_eq!(summary.stock_level, 0);
        assert!(!summary.purchasable);
        assert_eq!(summary.links.api, "https://api.example.test/products/987654");
    }

    #[test]
    fn error_shaped_payload_is_a_missing_field() {
        let payload = json!({ "errors": [{ "message": "Product not found" }] });
        let code = ProductCode::parse(111_111).expect("code");

        assert!(matches!(
            ProductSummary::from_json(code, &payload, "https://api.example.test"),
            Err(DomainError::MissingField { .. })
        ));
    }

    #[test]
    fn repeated_formatting_is_identical() {
        let payload = json!({
            "name": "Shampoo",
            "purchasable": true,
            "baseOptions": [{ "options": [{
                "priceData": { "value": "3.33" },
                "stock": { "stockLevel": 4 }
            }] }]
        });
        let code = ProductCode::parse(222_222).expect("code");

        let first = ProductSummary::from_json(code, &payload, "https://api.example.test");
        let second = ProductSummary::from_json(code, &payload, "https://api.example.test");
        assert_eq!(first, second);
    }
}
