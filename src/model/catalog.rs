//! Products and their categories, lounges, payment methods, and the data collected
//! when a bill is paid.

use crate::model::{PaymentMethodId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: u32,
    #[serde(default)]
    pub category_name: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: String::new(),
            image_url: None,
            is_active: true,
            category_id: 0,
            category_name: None,
        }
    }

    pub fn in_category(mut self, id: u32, name: impl Into<String>) -> Self {
        self.category_id = id;
        self.category_name = Some(name.into());
        self
    }
}

/// Query of `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<u32>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.is_active.is_none_or(|active| product.is_active == active)
            && self.category_id.is_none_or(|id| product.category_id == id)
            && self.search.as_deref().is_none_or(|needle| {
                product
                    .name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requires_authorization: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsPage {
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub product_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesPage {
    pub categories: Vec<Category>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// A dining area grouping tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lounge {
    pub id: u32,
    // Capitalized on the wire.
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoungesPage {
    pub lounges: Vec<Lounge>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoucherType {
    #[default]
    Boleta,
    Factura,
}

/// What the cashier enters when settling a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub voucher_type: VoucherType,
    #[serde(default)]
    pub customer_dni: String,
    #[serde(default)]
    pub customer_name: String,
    pub payment_method_id: PaymentMethodId,
    /// Amount tendered by the customer.
    pub amount: Decimal,
}

impl PaymentData {
    pub fn new(payment_method_id: PaymentMethodId, amount: Decimal) -> Self {
        Self {
            voucher_type: VoucherType::Boleta,
            customer_dni: String::new(),
            customer_name: String::new(),
            payment_method_id,
            amount,
        }
    }

    pub fn with_customer(mut self, dni: impl Into<String>, name: impl Into<String>) -> Self {
        self.customer_dni = dni.into();
        self.customer_name = name.into();
        self
    }

    pub fn invoice(mut self) -> Self {
        self.voucher_type = VoucherType::Factura;
        self
    }

    /// Customer name as sent to the backend; blank names are omitted.
    pub fn customer(&self) -> Option<String> {
        let name = self.customer_name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}
