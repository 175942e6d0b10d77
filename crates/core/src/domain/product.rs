use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;

/// Number of characters a product code must render to.
pub const PRODUCT_CODE_WIDTH: usize = 6;

/// Retailer product code.
///
/// Validity is judged on the rendered width of the integer, not its
/// magnitude: `-12345` passes, `012345` (which is `12345`) does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductCode(i64);

impl ProductCode {
    pub fn parse(raw: i64) -> Result<Self, DomainError> {
        if raw.to_string().len() == PRODUCT_CODE_WIDTH {
            Ok(Self(raw))
        } else {
            Err(DomainError::InvalidProductCode { input: raw.to_string() })
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for ProductCode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let raw = trimmed
            .parse::<i64>()
            .map_err(|_| DomainError::InvalidProductCode { input: trimmed.to_owned() })?;
        Self::parse(raw)
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const NAME_PATH: &str = "name";
const PURCHASABLE_PATH: &str = "purchasable";
const PRICE_PATH: &str = "baseOptions[0].options[0].priceData.value";
const STOCK_LEVEL_PATH: &str = "baseOptions[0].options[0].stock.stockLevel";

/// The subset of a product payload the bot renders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub purchasable: bool,
    pub price: Decimal,
    pub stock_level: i64,
    pub image_path: Option<String>,
}

impl ProductRecord {
    pub fn from_json(payload: &Value) -> Result<Self, DomainError> {
        let option = payload
            .pointer("/baseOptions/0/options/0")
            .ok_or_else(|| DomainError::missing_field(PRICE_PATH))?;

        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::missing_field(NAME_PATH))?
            .to_owned();
        let purchasable = payload
            .get("purchasable")
            .and_then(Value::as_bool)
            .ok_or_else(|| DomainError::missing_field(PURCHASABLE_PATH))?;
        let price = option
            .pointer("/priceData/value")
            .and_then(decimal_from_json)
            .ok_or_else(|| DomainError::missing_field(PRICE_PATH))?;
        let stock_level = option
            .pointer("/stock/stockLevel")
            .and_then(Value::as_i64)
            .ok_or_else(|| DomainError::missing_field(STOCK_LEVEL_PATH))?;
        let image_path =
            payload.pointer("/images/0/url").and_then(Value::as_str).map(str::to_owned);

        Ok(Self { name, purchasable, price, stock_level, image_path })
    }
}

/// Reads the message from the upstream `errors[0].message` shape.
pub fn upstream_error_message(payload: &Value) -> Result<String, DomainError> {
    payload
        .pointer("/errors/0/message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| DomainError::missing_field("errors[0].message"))
}

fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .ok(),
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{upstream_error_message, ProductCode, ProductRecord};
    use crate::errors::DomainError;

    fn product_json() -> serde_json::Value {
        json!({
            "name": "Superdrug Vitamin C 1000mg",
            "purchasable": true,
            "images": [{ "url": "/medias/vitc.jpg" }],
            "baseOptions": [{
                "options": [{
                    "priceData": { "value": 4.99 },
                    "stock": { "stockLevel": 17 }
                }]
            }]
        })
    }

    #[test]
    fn product_code_is_judged_by_rendered_width() {
        assert!(ProductCode::parse(123_456).is_ok());
        assert!(ProductCode::parse(-12_345).is_ok());
        assert!(ProductCode::parse(1234).is_err());
        assert!(ProductCode::parse(1_234_567).is_err());
        assert!("012345".parse::<ProductCode>().is_err());
        assert_eq!(" 654321 ".parse::<ProductCode>().map(|code| code.value()), Ok(654_321));
    }

    #[test]
    fn non_numeric_code_text_is_rejected_with_input() {
        assert_eq!(
            "abc123".parse::<ProductCode>(),
            Err(DomainError::InvalidProductCode { input: "abc123".to_owned() })
        );
    }

    #[test]
    fn product_record_reads_nested_option_fields() {
        let record = ProductRecord::from_json(&product_json()).expect("record");

        assert_eq!(record.name, "Superdrug Vitamin C 1000mg");
        assert!(record.purchasable);
        assert_eq!(record.price, Decimal::new(499, 2));
        assert_eq!(record.stock_level, 17);
        assert_eq!(record.image_path.as_deref(), Some("/medias/vitc.jpg"));
    }

    #[test]
    fn product_record_accepts_string_prices_and_missing_images() {
        let mut payload = product_json();
        payload["baseOptions"][0]["options"][0]["priceData"]["value"] = json!("12.50");
        payload.as_object_mut().expect("object").remove("images");

        let record = ProductRecord::from_json(&payload).expect("record");
        assert_eq!(record.price, Decimal::new(1250, 2));
        assert_eq!(record.image_path, None);
    }

    #[test]
    fn product_record_names_the_missing_path() {
        let mut payload = product_json();
        payload["baseOptions"][0]["options"][0]
            .as_object_mut()
            .expect("option object")
            .remove("stock");

        assert_eq!(
            ProductRecord::from_json(&payload),
            Err(DomainError::MissingField {
                path: "baseOptions[0].options[0].stock.stockLevel".to_owned()
            })
        );
    }

    #[test]
    fn upstream_error_message_reads_first_error() {
        let payload = json!({ "errors": [{ "message": "Product not found", "type": "UnknownIdentifierError" }] });
        assert_eq!(upstream_error_message(&payload).as_deref(), Ok("Product not found"));
        assert!(matches!(
            upstream_error_message(&json!({ "errors": [] })),
            Err(DomainError::MissingField { .. })
        ));
    }
}
