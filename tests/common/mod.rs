//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use order_desk::api::{Collaborators, MockBackend};
use order_desk::model::{
    CashBox, CashBoxId, CurrentUser, Order, OrderDetail, OrderId, OrderStatus, OrdersPage,
    PaymentMethodId, Product, ProductId, Table, TableId, TablesPage, UserId,
};
use order_desk::workflow::{WorkflowController, WorkflowSettings};
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn money(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn ana() -> CurrentUser {
    CurrentUser::new(1, "Ana")
}

pub fn luis() -> CurrentUser {
    CurrentUser::new(2, "Luis")
}

pub fn table(id: u32) -> Table {
    Table::new(TableId(id), format!("Mesa {id}"), "Salon", 4)
}

/// A table served by `user` with `order` unpaid.
pub fn busy_table(id: u32, user: &CurrentUser, order: u32) -> Table {
    let mut table = table(id);
    table.attach_order(user, OrderId(order));
    table
}

pub fn tables(tables: Vec<Table>) -> TablesPage {
    TablesPage {
        total: tables.len() as u32,
        tables,
        page: 1,
        page_size: 10,
    }
}

pub fn open_cash_box() -> CashBox {
    CashBox {
        id: CashBoxId(1),
        initial_amount: money("100.00"),
        final_amount: None,
        opening_date: None,
        closing_date: None,
        additional_note: None,
        is_closed: false,
        user_id: UserId(1),
        user_name: Some("Ana".into()),
        total_income: Decimal::ZERO,
        total_expense: Decimal::ZERO,
        current_balance: money("100.00"),
        cash_movements: Vec::new(),
    }
}

pub fn ceviche() -> Product {
    Product::new(ProductId(1), "Ceviche", money("10.00"))
}

pub fn causa() -> Product {
    Product::new(ProductId(2), "Causa", money("15.00"))
}

/// An unpaid order of `table` with the given lines.
pub fn order(id: u32, table: u32, lines: Vec<OrderDetail>) -> Order {
    let total = lines.iter().map(OrderDetail::amount).sum();
    Order {
        id: OrderId(id),
        order_number: format!("ORD-{id:05}"),
        order_date: None,
        status: OrderStatus::Pending,
        user_id: Some(UserId(1)),
        user_name: Some("Ana".into()),
        table_id: TableId(table),
        table_name: Some(format!("Mesa {table}")),
        worker_id: None,
        worker_name: None,
        payment_method_id: PaymentMethodId(1),
        payment_method_name: None,
        sub_total: total,
        discount: Decimal::ZERO,
        tax: Decimal::ZERO,
        total,
        customer_name: None,
        order_type: None,
        observations: None,
        is_paid: false,
        completed_at: None,
        order_details: lines,
    }
}

pub fn line(product: &Product, quantity: u32) -> OrderDetail {
    OrderDetail::line(product.id, &product.name, product.price, quantity)
}

pub fn orders(orders: Vec<Order>) -> OrdersPage {
    OrdersPage {
        total: orders.len() as u32,
        orders,
        page: 1,
        page_size: 50,
    }
}

pub fn paid(mut order: Order) -> Order {
    order.is_paid = true;
    order.status = OrderStatus::Completed;
    order
}

/// A controller for Ana over `mock`, with default settings.
pub fn controller(mock: &MockBackend) -> WorkflowController {
    WorkflowController::new(
        ana(),
        Collaborators::from_backend(Arc::new(mock.clone())),
        WorkflowSettings::default(),
    )
}
