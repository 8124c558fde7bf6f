//! Orders and their detail lines.

use crate::model::{OrderId, PaymentMethodId, ProductId, TableId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle status as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "En Proceso")]
    InProgress,
    #[serde(rename = "Completada")]
    Completed,
    #[serde(rename = "Cancelada")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::InProgress => "En Proceso",
            OrderStatus::Completed => "Completada",
            OrderStatus::Cancelled => "Cancelada",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub sub_total: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl OrderDetail {
    /// A new line where subtotal and total are both `unit_price * quantity`.
    pub fn line(
        product_id: ProductId,
        product_name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        let amount = unit_price * Decimal::from(quantity);
        Self {
            id: None,
            product_id: Some(product_id),
            product_name: product_name.into(),
            quantity,
            unit_price,
            sub_total: amount,
            total: amount,
            observations: None,
            status: None,
        }
    }

    /// Price of the line recomputed from its parts.
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub order_date: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub table_id: TableId,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub worker_id: Option<u32>,
    #[serde(default)]
    pub worker_name: Option<String>,
    pub payment_method_id: PaymentMethodId,
    #[serde(default)]
    pub payment_method_name: Option<String>,
    #[serde(default)]
    pub sub_total: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub order_details: Vec<OrderDetail>,
}

impl Order {
    /// Sum of `unit_price * quantity` over the detail lines.
    pub fn lines_total(&self) -> Decimal {
        self.order_details.iter().map(OrderDetail::amount).sum()
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub table_id: TableId,
    pub payment_method_id: PaymentMethodId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(default)]
    pub observations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    pub order_details: Vec<OrderDetail>,
}

/// Body of `PUT /orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub table_id: TableId,
    pub payment_method_id: PaymentMethodId,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub is_paid: bool,
}

/// Query of `GET /orders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub table_id: Option<TableId>,
    pub is_paid: Option<bool>,
}

impl OrderFilter {
    /// Unpaid orders of one table.
    pub fn unpaid_for(table: TableId) -> Self {
        Self {
            table_id: Some(table),
            is_paid: Some(false),
            ..Default::default()
        }
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }
}

/// One page of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn line_amounts_follow_quantity() {
        let line = OrderDetail::line(ProductId(3), "Ceviche", money("10.00"), 2);
        assert_eq!(line.sub_total, money("20.00"));
        assert_eq!(line.total, money("20.00"));
        assert_eq!(line.amount(), money("20.00"));
    }

    #[test]
    fn status_uses_backend_spelling() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"En Proceso\""
        );
        let status: OrderStatus = serde_json::from_str("\"Completada\"").unwrap();
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn create_request_is_camel_case() {
        let request = CreateOrderRequest {
            table_id: TableId(5),
            payment_method_id: PaymentMethodId(1),
            worker_id: None,
            customer_name: None,
            order_type: None,
            observations: String::new(),
            discount: None,
            tax: None,
            order_details: vec![OrderDetail::line(ProductId(1), "Lomo", money("12.50"), 1)],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tableId"], 5);
        assert_eq!(value["paymentMethodId"], 1);
        assert_eq!(value["orderDetails"][0]["subTotal"], 12.5);
        assert!(value.get("customerName").is_none());
    }
}
