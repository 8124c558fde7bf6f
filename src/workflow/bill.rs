//! The bill of a table and the result of paying it.

use crate::model::{Order, OrderId, ProductId, TableId, VoucherType};
use rust_decimal::Decimal;

/// One detail line of one of the table's unpaid orders.
#[derive(Debug, Clone, PartialEq)]
pub struct BillLine {
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// Every unpaid order of a table, flattened into lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub table: TableId,
    pub orders: Vec<Order>,
    pub lines: Vec<BillLine>,
    /// Sum of `unit_price * quantity` over all lines.
    pub total: Decimal,
}

impl Bill {
    pub fn from_orders(table: TableId, orders: Vec<Order>) -> Self {
        let lines: Vec<BillLine> = orders
            .iter()
            .flat_map(|order| {
                order.order_details.iter().map(move |detail| BillLine {
                    order_id: order.id,
                    product_id: detail.product_id,
                    product_name: detail.product_name.clone(),
                    quantity: detail.quantity,
                    unit_price: detail.unit_price,
                    amount: detail.amount(),
                })
            })
            .collect();
        let total = orders.iter().map(Order::lines_total).sum();
        Self {
            table,
            orders,
            lines,
            total,
        }
    }

    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|order| order.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The bill left after `settled` orders were paid.
    pub fn without(&self, settled: &[OrderId]) -> Self {
        let orders = self
            .orders
            .iter()
            .filter(|order| !settled.contains(&order.id))
            .cloned()
            .collect();
        Self::from_orders(self.table, orders)
    }
}

/// A fully paid bill.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub table: TableId,
    pub orders: Vec<OrderId>,
    pub total: Decimal,
    pub tendered: Decimal,
    /// `tendered - total`, never negative.
    pub change: Decimal,
    pub voucher_type: VoucherType,
    pub customer_name: Option<String>,
}
