//! # Order Actor
//!
//! Orders depend on the other two actors: creation checks the table and the open cash
//! box, and marking an order as paid books its total as income in the open cash box.
//! Both clients are injected as the actor's context.

use crate::backend::cash_box_actor::CashBoxAction;
use crate::backend::BackendError;
use crate::framework::{ActorEntity, ResourceActor, ResourceClient};
use crate::model::{
    CashBox, CreateOrderRequest, CurrentUser, MovementType, Order, OrderFilter, OrderId,
    OrderStatus, Table, UpdateOrderRequest,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

/// Payload for creating an order on behalf of `user`.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub request: CreateOrderRequest,
    pub user: CurrentUser,
    pub payment_method_name: Option<String>,
}

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Idempotent: paying a paid order returns it unchanged.
    MarkPaid,
}

/// Dependencies of the order actor.
pub type OrderContext = (ResourceClient<Table>, ResourceClient<CashBox>);

async fn open_cash_box(cash_boxes: &ResourceClient<CashBox>) -> Result<CashBox, BackendError> {
    cash_boxes
        .list(Some(false))
        .await?
        .into_iter()
        .next()
        .ok_or(BackendError::NoOpenCashBox)
}

impl OrderFilter {
    fn accepts(&self, order: &Order) -> bool {
        self.table_id.is_none_or(|id| order.table_id == id)
            && self.is_paid.is_none_or(|paid| order.is_paid == paid)
            && self.status.is_none_or(|status| order.status == status)
            && self.search.as_deref().is_none_or(|needle| {
                let needle = needle.to_lowercase();
                order.order_number.to_lowercase().contains(&needle)
                    || order
                        .customer_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = UpdateOrderRequest;
    type Action = OrderAction;
    type ActionResult = Order;
    type Filter = OrderFilter;
    type Context = OrderContext;
    type Error = BackendError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, BackendError> {
        let request = params.request;
        if request.order_details.is_empty() {
            return Err(BackendError::Invalid("an order needs at least one line".into()));
        }
        if request.order_details.iter().any(|line| line.quantity == 0) {
            return Err(BackendError::Invalid("line quantities must be positive".into()));
        }

        let sub_total: Decimal = request.order_details.iter().map(|line| line.amount()).sum();
        let discount = request.discount.unwrap_or_default();
        let tax = request.tax.unwrap_or_default();
        let order_details = request
            .order_details
            .into_iter()
            .enumerate()
            .map(|(n, mut line)| {
                line.id = Some(n as u32 + 1);
                line.sub_total = line.amount();
                line.total = line.sub_total;
                line
            })
            .collect();

        Ok(Self {
            id,
            order_number: format!("ORD-{:05}", id.0),
            order_date: None,
            status: OrderStatus::Pending,
            user_id: Some(params.user.id),
            user_name: Some(params.user.name),
            table_id: request.table_id,
            table_name: None,
            worker_id: request.worker_id,
            worker_name: None,
            payment_method_id: request.payment_method_id,
            payment_method_name: params.payment_method_name,
            sub_total,
            discount,
            tax,
            total: sub_total - discount + tax,
            customer_name: request.customer_name,
            order_type: request.order_type,
            observations: Some(request.observations).filter(|o| !o.is_empty()),
            is_paid: false,
            completed_at: None,
            order_details,
        })
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.accepts(self)
    }

    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), BackendError> {
        let (tables, cash_boxes) = ctx;
        let table = tables
            .get(self.table_id)
            .await?
            .ok_or_else(|| BackendError::NotFound(self.table_id.to_string()))?;
        if !table.is_active {
            return Err(BackendError::Invalid(format!("{} is inactive", table.id)));
        }
        self.table_name = Some(table.name);
        open_cash_box(cash_boxes).await?;
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: UpdateOrderRequest,
        ctx: &OrderContext,
    ) -> Result<(), BackendError> {
        let (tables, _) = ctx;
        if self.is_paid {
            return Err(BackendError::Conflict(format!("{} is already paid", self.id)));
        }
        if update.table_id != self.table_id {
            let table = tables
                .get(update.table_id)
                .await?
                .ok_or_else(|| BackendError::NotFound(update.table_id.to_string()))?;
            self.table_id = table.id;
            self.table_name = Some(table.name);
        }
        self.payment_method_id = update.payment_method_id;
        self.status = update.status;
        self.customer_name = update.customer_name.or(self.customer_name.take());
        if update.observations.is_some() {
            self.observations = update.observations;
        }
        self.is_paid = update.is_paid;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<Order, BackendError> {
        let (_, cash_boxes) = ctx;
        match action {
            OrderAction::MarkPaid => {
                if self.is_paid {
                    return Ok(self.clone());
                }
                let cash_box = open_cash_box(cash_boxes).await?;
                if self.total > Decimal::ZERO {
                    cash_boxes
                        .perform_action(
                            cash_box.id,
                            CashBoxAction::Record {
                                movement_type: MovementType::Income,
                                amount: self.total,
                                concept: format!("Pago de pedido {}", self.order_number),
                            },
                        )
                        .await?;
                    info!(order = %self.id, cash_box = %cash_box.id, total = %self.total, "Income recorded");
                }
                self.is_paid = true;
                self.status = OrderStatus::Completed;
                Ok(self.clone())
            }
        }
    }
}

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::cash_box_actor::{self, OpenCashBox};
    use crate::backend::table_actor::{self, NewTable};
    use crate::model::{OpenCashBoxRequest, OrderDetail, PaymentMethodId, ProductId, TableId};

    fn request(table: TableId) -> OrderCreate {
        OrderCreate {
            request: CreateOrderRequest {
                table_id: table,
                payment_method_id: PaymentMethodId(1),
                worker_id: None,
                customer_name: None,
                order_type: None,
                observations: String::new(),
                discount: None,
                tax: None,
                order_details: vec![OrderDetail::line(
                    ProductId(1),
                    "Ceviche",
                    Decimal::new(1000, 2),
                    2,
                )],
            },
            user: CurrentUser::new(1, "Ana"),
            payment_method_name: None,
        }
    }

    /// Real order actor with real table and cash box actors.
    async fn setup() -> (
        ResourceClient<Order>,
        ResourceClient<Table>,
        ResourceClient<CashBox>,
    ) {
        let (table_actor, tables) = table_actor::new();
        let (cash_box_actor, cash_boxes) = cash_box_actor::new();
        let (order_actor, orders) = new();
        tokio::spawn(table_actor.run(()));
        tokio::spawn(cash_box_actor.run(()));
        tokio::spawn(order_actor.run((tables.clone(), cash_boxes.clone())));
        tables
            .create(NewTable::new("Mesa 1", "Salon", 4))
            .await
            .unwrap();
        (orders, tables, cash_boxes)
    }

    async fn open_box(cash_boxes: &ResourceClient<CashBox>) -> CashBox {
        cash_boxes
            .create(OpenCashBox {
                request: OpenCashBoxRequest {
                    initial_amount: Decimal::new(5000, 2),
                    additional_note: None,
                },
                user: CurrentUser::new(1, "Ana"),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creation_requires_open_cash_box() {
        let (orders, _tables, cash_boxes) = setup().await;

        let err = orders.create(request(TableId(1))).await.unwrap_err();
        assert_eq!(
            err.entity_error::<BackendError>(),
            Some(&BackendError::NoOpenCashBox)
        );

        open_box(&cash_boxes).await;
        let order = orders.create(request(TableId(1))).await.unwrap();
        assert_eq!(order.id, OrderId(1));
        assert_eq!(order.order_number, "ORD-00001");
        assert_eq!(order.total, Decimal::new(2000, 2));
        assert_eq!(order.table_name.as_deref(), Some("Mesa 1"));

        let err = orders.create(request(TableId(7))).await.unwrap_err();
        assert!(matches!(
            err.entity_error::<BackendError>(),
            Some(BackendError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn mark_paid_books_income_once() {
        let (orders, _tables, cash_boxes) = setup().await;
        let cash_box = open_box(&cash_boxes).await;
        let order = orders.create(request(TableId(1))).await.unwrap();

        let paid = orders.perform_action(order.id, OrderAction::MarkPaid).await.unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.status, OrderStatus::Completed);

        // Second call is a no-op.
        orders.perform_action(order.id, OrderAction::MarkPaid).await.unwrap();

        let cash_box = cash_boxes.get(cash_box.id).await.unwrap().unwrap();
        assert_eq!(cash_box.cash_movements.len(), 1);
        assert_eq!(cash_box.total_income, Decimal::new(2000, 2));
        assert_eq!(cash_box.current_balance, Decimal::new(7000, 2));

        let unpaid = orders.list(OrderFilter::unpaid_for(TableId(1))).await.unwrap();
        assert!(unpaid.is_empty());
    }

    #[tokio::test]
    async fn paid_orders_cannot_be_updated() {
        let (orders, _tables, cash_boxes) = setup().await;
        open_box(&cash_boxes).await;
        let order = orders.create(request(TableId(1))).await.unwrap();
        orders.perform_action(order.id, OrderAction::MarkPaid).await.unwrap();

        let err = orders
            .update(
                order.id,
                UpdateOrderRequest {
                    table_id: TableId(1),
                    payment_method_id: PaymentMethodId(2),
                    status: OrderStatus::Completed,
                    customer_name: None,
                    observations: None,
                    is_paid: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.entity_error::<BackendError>(),
            Some(BackendError::Conflict(_))
        ));
    }
}
