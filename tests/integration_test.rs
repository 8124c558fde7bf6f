//! End-to-end flows through `OrderDesk` on the in-memory backend.
//!
//! Real actors all the way down: workflow actor, then tables, orders and cash boxes.

mod common;

use common::*;
use order_desk::api::{CashBoxApi, Collaborators};
use order_desk::backend::{Catalog, MemoryBackend, NewTable, TableUpdate};
use order_desk::config::Config;
use order_desk::lifecycle::OrderDesk;
use order_desk::model::{
    MovementType, OpenCashBoxRequest, PaymentData, PaymentMethodId, Product, ProductFilter,
    ProductId, TableId, TableStatus,
};
use order_desk::workflow::{
    Selection, WorkflowController, WorkflowError, WorkflowSettings, WorkflowState,
};
use std::sync::Arc;

fn config() -> Config {
    Config {
        user: ana(),
        ..Config::default()
    }
}

/// A desk for Ana with three tables. The cash box is opened when `open` is set.
async fn desk(open: bool) -> (OrderDesk, MemoryBackend) {
    let desk = OrderDesk::in_memory(&config(), Catalog::demo());
    let memory = desk.memory().unwrap().clone();
    for n in 1..=3 {
        memory
            .add_table(NewTable::new(format!("Mesa {n}"), "Salon", 4))
            .await
            .unwrap();
    }
    if open {
        memory
            .open_cash_box(&OpenCashBoxRequest {
                initial_amount: money("100.00"),
                additional_note: None,
            })
            .await
            .unwrap();
    }
    desk.workflow.refresh_tables().await.unwrap();
    (desk, memory)
}

async fn product(desk: &OrderDesk, id: u32) -> Product {
    desk.workflow
        .products(ProductFilter::default())
        .await
        .unwrap()
        .into_iter()
        .find(|product| product.id == ProductId(id))
        .unwrap()
}

#[tokio::test]
async fn full_cycle_from_free_table_to_payment() {
    let (desk, memory) = desk(true).await;
    let workflow = &desk.workflow;
    let ceviche = product(&desk, 1).await; // 10.00
    let causa = product(&desk, 2).await; // 15.00

    // Seat and order 2 x ceviche.
    assert_eq!(
        workflow.select_table(TableId(1)).await.unwrap(),
        Selection::NeedsConfirmation(TableId(1))
    );
    workflow.confirm_table().await.unwrap();
    workflow.add_to_cart(ceviche.clone()).await.unwrap();
    assert_eq!(workflow.add_to_cart(ceviche).await.unwrap(), 2);
    let first = workflow.submit_order().await.unwrap();
    assert_eq!(first.total, money("20.00"));
    assert_eq!(first.order_details.len(), 1);
    assert_eq!(first.order_details[0].sub_total, money("20.00"));

    let snapshot = workflow.snapshot().await.unwrap();
    assert!(snapshot.state.is_browsing());
    let view = &snapshot.tables[0];
    assert_eq!(view.status, TableStatus::InProcess);
    assert_eq!(view.table.current_order_id, Some(first.id));
    assert_eq!(view.table.current_order_is_paid, Some(false));
    assert_eq!(view.table.occupied_by.as_deref(), Some("Ana"));

    // Back to the same table: resumed without confirmation, second order.
    match workflow.select_table(TableId(1)).await.unwrap() {
        Selection::Resumed { order, .. } => assert_eq!(order.id, first.id),
        other => panic!("expected a resumed table, got {other:?}"),
    }
    workflow.add_to_cart(causa).await.unwrap();
    workflow.submit_order().await.unwrap();

    // One bill for both orders.
    let bill = workflow.request_payment(TableId(1)).await.unwrap();
    assert_eq!(bill.orders.len(), 2);
    assert_eq!(bill.total, money("35.00"));

    let settlement = workflow
        .confirm_payment(PaymentData::new(PaymentMethodId(1), money("40.00")).with_customer("", "Rosa"))
        .await
        .unwrap();
    assert_eq!(settlement.total, money("35.00"));
    assert_eq!(settlement.change, money("5.00"));

    let snapshot = workflow.snapshot().await.unwrap();
    assert_eq!(snapshot.state, WorkflowState::Browsing);
    assert_eq!(snapshot.tables[0].status, TableStatus::Available);
    assert!(!snapshot.tables[0].table.is_occupied);

    // Both payments were booked as income.
    let cash_box = memory.active_cash_box().await.unwrap().unwrap();
    assert_eq!(cash_box.cash_movements.len(), 2);
    assert!(cash_box
        .cash_movements
        .iter()
        .all(|movement| movement.movement_type == MovementType::Income));
    assert_eq!(cash_box.total_income, money("35.00"));
    assert_eq!(cash_box.current_balance, money("135.00"));

    // Nothing is left to pay.
    assert!(matches!(
        workflow.request_payment(TableId(1)).await,
        Err(WorkflowError::NothingToPay(_))
    ));

    // The table's history keeps both orders, now paid.
    let history = workflow.order_history(Some(TableId(1))).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|order| order.is_paid));
    assert_eq!(workflow.order_history(None).await.unwrap().len(), 2);
    assert!(workflow.order_history(Some(TableId(2))).await.unwrap().is_empty());

    drop(memory);
    desk.shutdown().await.unwrap();
}

#[tokio::test]
async fn no_order_is_taken_without_a_cash_box() {
    let (desk, memory) = desk(false).await;
    let ceviche = product(&desk, 1).await;

    desk.workflow.select_table(TableId(2)).await.unwrap();
    desk.workflow.confirm_table().await.unwrap();
    desk.workflow.add_to_cart(ceviche).await.unwrap();

    assert!(matches!(
        desk.workflow.submit_order().await,
        Err(WorkflowError::NoOpenCashBox)
    ));
    let snapshot = desk.workflow.snapshot().await.unwrap();
    assert_eq!(snapshot.cart.len(), 1);
    assert_eq!(snapshot.state.table(), Some(TableId(2)));

    drop(memory);
    desk.shutdown().await.unwrap();
}

#[tokio::test]
async fn second_user_cannot_take_a_served_table() {
    let (desk, memory) = desk(true).await;
    let ceviche = product(&desk, 1).await;

    desk.workflow.select_table(TableId(2)).await.unwrap();
    desk.workflow.confirm_table().await.unwrap();
    desk.workflow.add_to_cart(ceviche).await.unwrap();
    desk.workflow.submit_order().await.unwrap();

    // Luis works on the same backend through his own controller.
    let mut luis_desk = WorkflowController::new(
        luis(),
        Collaborators::from_backend(Arc::new(memory.for_user(luis()))),
        WorkflowSettings::default(),
    );
    luis_desk.refresh_tables().await.unwrap();

    match luis_desk.select_table(TableId(2)).await {
        Err(WorkflowError::TableTaken { table, by }) => {
            assert_eq!(table, TableId(2));
            assert_eq!(by, "Ana");
        }
        other => panic!("expected TableTaken, got {other:?}"),
    }
    assert!(matches!(
        luis_desk.request_payment(TableId(2)).await,
        Err(WorkflowError::TableTaken { .. })
    ));
    assert!(luis_desk.state().is_browsing());

    // Other tables are still his to take.
    assert_eq!(
        luis_desk.select_table(TableId(3)).await.unwrap(),
        Selection::NeedsConfirmation(TableId(3))
    );

    drop(luis_desk);
    drop(memory);
    desk.shutdown().await.unwrap();
}

#[tokio::test]
async fn backend_rejections_reach_the_caller() {
    let (desk, memory) = desk(true).await;
    let ceviche = product(&desk, 1).await;

    desk.workflow.select_table(TableId(3)).await.unwrap();
    desk.workflow.confirm_table().await.unwrap();
    desk.workflow.add_to_cart(ceviche).await.unwrap();

    // The table is switched off behind the workflow's back.
    memory
        .update_table(
            TableId(3),
            TableUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        desk.workflow.submit_order().await,
        Err(WorkflowError::Backend(_))
    ));
    let snapshot = desk.workflow.snapshot().await.unwrap();
    assert_eq!(snapshot.cart.len(), 1);

    drop(memory);
    desk.shutdown().await.unwrap();
}

#[tokio::test]
async fn start_picks_the_configured_backend() {
    let desk = OrderDesk::start(&config()).unwrap();
    assert!(desk.memory().is_some());
    let methods = desk.workflow.payment_methods().await.unwrap();
    assert_eq!(methods.len(), 3);
    assert_eq!(desk.workflow.categories().await.unwrap().len(), 3);
    assert_eq!(desk.workflow.lounges().await.unwrap().len(), 2);
    desk.shutdown().await.unwrap();
}
