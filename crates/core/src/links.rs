use serde::Serialize;

use crate::domain::product::ProductCode;

pub const PRODUCT_PAGE_BASE_URL: &str = "https://superdrug.com/~/p";
pub const SELLER_LOOKUP_BASE_URL: &str =
    "https://sas.selleramp.com/sas/lookup?SasLookup%5Bsearch_term%5D=";
pub const CASHBACK_URL: &str = "https://www.topcashback.co.uk/superdrug";
pub const MEDIA_BASE_URL: &str = "https://media.superdrug.com";

/// External links rendered alongside a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductLinks {
    pub product_page: String,
    pub seller_lookup: String,
    pub cashback: String,
    pub image: Option<String>,
    pub api: String,
}

impl ProductLinks {
    pub fn new(
        code: ProductCode,
        title: &str,
        image_path: Option<&str>,
        api_base_url: &str,
    ) -> Self {
        Self {
            product_page: product_page_url(code),
            seller_lookup: seller_lookup_url(title),
            cashback: CASHBACK_URL.to_owned(),
            image: image_path.map(|path| format!("{MEDIA_BASE_URL}{path}")),
            api: format!("{}/products/{code}", api_base_url.trim_end_matches('/')),
        }
    }
}

pub fn product_page_url(code: ProductCode) -> String {
    format!("{PRODUCT_PAGE_BASE_URL}/{code}")
}

pub fn seller_lookup_url(title: &str) -> String {
    format!("{SELLER_LOOKUP_BASE_URL}{}", title.replace(' ', "+"))
}
