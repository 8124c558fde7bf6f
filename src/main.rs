use order_desk::api::CashBoxApi;
use order_desk::backend::{MemoryBackend, NewTable};
use order_desk::config::Config;
use order_desk::lifecycle::{setup_tracing, OrderDesk};
use order_desk::model::{OpenCashBoxRequest, PaymentData, ProductFilter, TableId};
use order_desk::workflow::{NoticeLevel, Selection, WorkflowHandle};
use rust_decimal::Decimal;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = Config::from_env().map_err(|e| e.to_string())?;
    info!(backend = ?config.backend, user = %config.user.name, "Starting order desk");

    let desk = OrderDesk::start(&config).map_err(|e| e.to_string())?;

    let mut notices = desk.workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            match notice.level {
                NoticeLevel::Success => info!(notice = %notice.message),
                NoticeLevel::Warning => warn!(notice = %notice.message),
                NoticeLevel::Error => error!(notice = %notice.message),
            }
        }
    });

    match desk.memory() {
        Some(memory) => {
            seed(memory).instrument(tracing::info_span!("seed")).await?;
            desk.workflow.refresh_tables().await.map_err(|e| e.to_string())?;
            if let Err(e) = serve_table(&desk.workflow, TableId(1)).await {
                error!(error = %e, "Demo cycle failed");
            }
        }
        None => {
            let snapshot = desk.workflow.snapshot().await.map_err(|e| e.to_string())?;
            info!(tables = snapshot.tables.len(), total = snapshot.total_tables, "Tables loaded");
        }
    }

    desk.shutdown().await?;
    info!("Order desk stopped");
    Ok(())
}

/// A small dining room and an open cash box.
async fn seed(memory: &MemoryBackend) -> Result<(), String> {
    for (name, capacity) in [("Mesa 1", 4), ("Mesa 2", 2), ("Mesa 3", 6)] {
        memory
            .add_table(NewTable::new(name, "Salon", capacity).in_lounge(1, "Principal"))
            .await
            .map_err(|e| e.to_string())?;
    }
    let cash_box = memory
        .open_cash_box(&OpenCashBoxRequest {
            initial_amount: Decimal::new(10000, 2),
            additional_note: Some("Apertura".into()),
        })
        .await
        .map_err(|e| e.to_string())?;
    info!(cash_box = %cash_box.id, "Demo data ready");
    Ok(())
}

/// One full cycle: seat, order, pay.
async fn serve_table(workflow: &WorkflowHandle, table: TableId) -> Result<(), String> {
    async {
        if let Selection::NeedsConfirmation(_) =
            workflow.select_table(table).await.map_err(|e| e.to_string())?
        {
            workflow.confirm_table().await.map_err(|e| e.to_string())?;
        }
        let products = workflow
            .products(ProductFilter::default())
            .await
            .map_err(|e| e.to_string())?;
        for product in products.iter().take(2) {
            workflow.add_to_cart(product.clone()).await.map_err(|e| e.to_string())?;
        }
        if let Some(first) = products.first() {
            workflow.add_to_cart(first.clone()).await.map_err(|e| e.to_string())?;
        }
        let order = workflow.submit_order().await.map_err(|e| e.to_string())?;
        info!(order = %order.id, total = %order.total, "Order sent");
        Ok::<_, String>(())
    }
    .instrument(tracing::info_span!("order_taking", table = %table))
    .await?;

    async {
        let bill = workflow.request_payment(table).await.map_err(|e| e.to_string())?;
        let methods = workflow.payment_methods().await.map_err(|e| e.to_string())?;
        let method = methods.first().ok_or("no payment methods")?;
        let settlement = workflow
            .confirm_payment(PaymentData::new(method.id, bill.total + Decimal::TEN))
            .await
            .map_err(|e| e.to_string())?;
        info!(total = %settlement.total, change = %settlement.change, "Table settled");
        Ok(())
    }
    .instrument(tracing::info_span!("payment", table = %table))
    .await
}
