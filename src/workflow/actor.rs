//! # Workflow Actor
//!
//! One Tokio task owns the [`WorkflowController`] and applies requests to it one at a
//! time, the way [`ResourceActor`](crate::framework::ResourceActor) owns its store.
//! [`WorkflowHandle`] is the cloneable sending half.
//!
//! While the controller is browsing, the actor also refreshes the board every poll
//! interval. The timer only exists in that state: leaving it drops the timer and
//! coming back creates a new one, so a refresh can never race a selected table.
//!
//! Every command outcome is published as a [`Notice`] on a broadcast channel.

use crate::model::{
    Category, Lounge, Order, PaymentData, PaymentMethod, Product, ProductFilter, ProductId,
    TableFilter, TableId,
};
use crate::workflow::{
    Bill, CartItem, Notice, Selection, Settlement, Snapshot, WorkflowController, WorkflowError,
};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

type Reply<T> = oneshot::Sender<Result<T, WorkflowError>>;

const NOTICE_CAPACITY: usize = 64;

/// Messages understood by the workflow actor.
pub enum WorkflowRequest {
    SelectTable { table: TableId, respond_to: Reply<Selection> },
    ConfirmTable { respond_to: Reply<TableId> },
    CancelConfirmation { respond_to: Reply<Option<TableId>> },
    LeaveTable { respond_to: Reply<TableId> },
    AddToCart { product: Product, respond_to: Reply<u32> },
    UpdateQuantity { product: ProductId, quantity: u32, respond_to: Reply<()> },
    AdjustQuantity { product: ProductId, delta: i32, respond_to: Reply<u32> },
    RemoveFromCart { product: ProductId, respond_to: Reply<CartItem> },
    SubmitOrder { respond_to: Reply<Order> },
    RequestPayment { table: TableId, respond_to: Reply<Bill> },
    CancelPayment { respond_to: Reply<TableId> },
    ConfirmPayment { payment: PaymentData, respond_to: Reply<Settlement> },
    RefreshTables { respond_to: Reply<()> },
    SetTableFilter { filter: TableFilter, respond_to: Reply<()> },
    Products { filter: ProductFilter, respond_to: Reply<Vec<Product>> },
    PaymentMethods { respond_to: Reply<Vec<PaymentMethod>> },
    Categories { respond_to: Reply<Vec<Category>> },
    Lounges { respond_to: Reply<Vec<Lounge>> },
    OrderHistory { table: Option<TableId>, respond_to: Reply<Vec<Order>> },
    Snapshot { respond_to: Reply<Snapshot> },
}

enum Event {
    Request(Option<WorkflowRequest>),
    Poll,
}

pub struct WorkflowActor {
    controller: WorkflowController,
    receiver: mpsc::Receiver<WorkflowRequest>,
    notices: broadcast::Sender<Notice>,
    period: Duration,
    poll: Option<Interval>,
}

impl WorkflowActor {
    /// Creates the actor and its handle. The poll period comes from the controller's
    /// settings.
    pub fn new(controller: WorkflowController) -> (Self, WorkflowHandle) {
        let (sender, receiver) = mpsc::channel(32);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let period = controller.settings().poll_interval;
        let handle = WorkflowHandle {
            sender,
            notices: notices.clone(),
        };
        let actor = Self {
            controller,
            receiver,
            notices,
            period,
            poll: None,
        };
        (actor, handle)
    }

    /// Loads the board, then serves requests until every handle has been dropped.
    pub async fn run(mut self) {
        info!(user = %self.controller.user().id, "Workflow started");
        if let Err(e) = self.controller.refresh_tables().await {
            warn!(error = %e, "Initial board load failed");
            self.publish(Notice::from(&e));
        }
        self.sync_poll();

        loop {
            let event = tokio::select! {
                request = self.receiver.recv() => Event::Request(request),
                _ = next_tick(&mut self.poll) => Event::Poll,
            };
            match event {
                Event::Request(Some(request)) => self.handle(request).await,
                Event::Request(None) => break,
                Event::Poll => {
                    debug!("Polling tables");
                    if let Err(e) = self.controller.refresh_tables().await {
                        warn!(error = %e, "Table poll failed");
                    }
                }
            }
            self.sync_poll();
        }

        info!("Workflow stopped");
    }

    /// Arms the poll timer while browsing and drops it otherwise.
    fn sync_poll(&mut self) {
        if !self.controller.state().is_browsing() {
            if self.poll.take().is_some() {
                debug!("Polling suspended");
            }
            return;
        }
        if self.poll.is_none() {
            let mut interval = interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.poll = Some(interval);
            debug!(period = ?self.period, "Polling armed");
        }
    }

    fn publish(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    /// Publishes the outcome of a command and any refresh failure it left behind.
    fn report<T>(&mut self, result: &Result<T, WorkflowError>, success: impl FnOnce(&T) -> String) {
        match result {
            Ok(value) => self.publish(Notice::success(success(value))),
            Err(e) => self.publish(Notice::from(e)),
        }
        if let Some(failure) = self.controller.take_refresh_failure() {
            self.publish(Notice::warning(failure));
        }
    }

    async fn handle(&mut self, request: WorkflowRequest) {
        match request {
            WorkflowRequest::SelectTable { table, respond_to } => {
                let result = self.controller.select_table(table).await;
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::ConfirmTable { respond_to } => {
                let result = self.controller.confirm_table();
                self.report(&result, |table| format!("Serving {table}"));
                let _ = respond_to.send(result);
            }
            WorkflowRequest::CancelConfirmation { respond_to } => {
                let _ = respond_to.send(Ok(self.controller.cancel_confirmation()));
            }
            WorkflowRequest::LeaveTable { respond_to } => {
                let _ = respond_to.send(self.controller.leave_table());
            }
            WorkflowRequest::AddToCart { product, respond_to } => {
                let result = self.controller.add_to_cart(&product);
                self.report(&result, |_| format!("{} added to the cart", product.name));
                let _ = respond_to.send(result);
            }
            WorkflowRequest::UpdateQuantity {
                product,
                quantity,
                respond_to,
            } => {
                let result = self.controller.update_quantity(product, quantity);
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::AdjustQuantity {
                product,
                delta,
                respond_to,
            } => {
                let result = self.controller.adjust_quantity(product, delta);
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::RemoveFromCart { product, respond_to } => {
                let result = self.controller.remove_from_cart(product);
                self.report(&result, |item| format!("{} removed from the cart", item.name));
                let _ = respond_to.send(result);
            }
            WorkflowRequest::SubmitOrder { respond_to } => {
                let result = self.controller.submit_order().await;
                self.report(&result, |order| {
                    format!("Order {} created for {}", order.order_number, order.table_id)
                });
                let _ = respond_to.send(result);
            }
            WorkflowRequest::RequestPayment { table, respond_to } => {
                let result = self.controller.request_payment(table).await;
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::CancelPayment { respond_to } => {
                let _ = respond_to.send(self.controller.cancel_payment());
            }
            WorkflowRequest::ConfirmPayment {
                payment,
                respond_to,
            } => {
                let result = self.controller.confirm_payment(payment).await;
                self.report(&result, |settlement| {
                    format!(
                        "{} paid: {} orders, total {}, change {}",
                        settlement.table,
                        settlement.orders.len(),
                        settlement.total,
                        settlement.change
                    )
                });
                let _ = respond_to.send(result);
            }
            WorkflowRequest::RefreshTables { respond_to } => {
                let result = self.controller.refresh_tables().await;
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::SetTableFilter { filter, respond_to } => {
                let result = self.controller.set_table_filter(filter).await;
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::Products { filter, respond_to } => {
                let _ = respond_to.send(self.controller.products(filter).await);
            }
            WorkflowRequest::PaymentMethods { respond_to } => {
                let _ = respond_to.send(self.controller.payment_methods().await);
            }
            WorkflowRequest::Categories { respond_to } => {
                let _ = respond_to.send(self.controller.categories().await);
            }
            WorkflowRequest::Lounges { respond_to } => {
                let _ = respond_to.send(self.controller.lounges().await);
            }
            WorkflowRequest::OrderHistory { table, respond_to } => {
                let result = self.controller.order_history(table).await;
                if let Err(e) = &result {
                    self.publish(Notice::from(e));
                }
                let _ = respond_to.send(result);
            }
            WorkflowRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(Ok(self.controller.snapshot()));
            }
        }
    }
}

/// Resolves on the next poll tick, or never when polling is off.
async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable handle to a running [`WorkflowActor`].
///
/// Every method fails with [`WorkflowError::Closed`] once the actor has stopped.
#[derive(Clone)]
pub struct WorkflowHandle {
    sender: mpsc::Sender<WorkflowRequest>,
    notices: broadcast::Sender<Notice>,
}

impl WorkflowHandle {
    /// Notices published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> WorkflowRequest,
    ) -> Result<T, WorkflowError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| WorkflowError::Closed)?;
        response.await.map_err(|_| WorkflowError::Closed)?
    }

    pub async fn select_table(&self, table: TableId) -> Result<Selection, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::SelectTable { table, respond_to })
            .await
    }

    pub async fn confirm_table(&self) -> Result<TableId, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::ConfirmTable { respond_to })
            .await
    }

    pub async fn cancel_confirmation(&self) -> Result<Option<TableId>, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::CancelConfirmation { respond_to })
            .await
    }

    pub async fn leave_table(&self) -> Result<TableId, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::LeaveTable { respond_to })
            .await
    }

    pub async fn add_to_cart(&self, product: Product) -> Result<u32, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::AddToCart {
            product,
            respond_to,
        })
        .await
    }

    pub async fn update_quantity(&self, product: ProductId, quantity: u32) -> Result<(), WorkflowError> {
        self.request(|respond_to| WorkflowRequest::UpdateQuantity {
            product,
            quantity,
            respond_to,
        })
        .await
    }

    pub async fn adjust_quantity(&self, product: ProductId, delta: i32) -> Result<u32, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::AdjustQuantity {
            product,
            delta,
            respond_to,
        })
        .await
    }

    pub async fn remove_from_cart(&self, product: ProductId) -> Result<CartItem, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::RemoveFromCart {
            product,
            respond_to,
        })
        .await
    }

    pub async fn submit_order(&self) -> Result<Order, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::SubmitOrder { respond_to })
            .await
    }

    pub async fn request_payment(&self, table: TableId) -> Result<Bill, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::RequestPayment { table, respond_to })
            .await
    }

    pub async fn cancel_payment(&self) -> Result<TableId, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::CancelPayment { respond_to })
            .await
    }

    pub async fn confirm_payment(&self, payment: PaymentData) -> Result<Settlement, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::ConfirmPayment {
            payment,
            respond_to,
        })
        .await
    }

    pub async fn refresh_tables(&self) -> Result<(), WorkflowError> {
        self.request(|respond_to| WorkflowRequest::RefreshTables { respond_to })
            .await
    }

    pub async fn set_table_filter(&self, filter: TableFilter) -> Result<(), WorkflowError> {
        self.request(|respond_to| WorkflowRequest::SetTableFilter { filter, respond_to })
            .await
    }

    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<Product>, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::Products { filter, respond_to })
            .await
    }

    pub async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::PaymentMethods { respond_to })
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::Categories { respond_to })
            .await
    }

    pub async fn lounges(&self) -> Result<Vec<Lounge>, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::Lounges { respond_to })
            .await
    }

    /// Orders of `table`, or the restaurant's paid orders when `table` is `None`.
    pub async fn order_history(&self, table: Option<TableId>) -> Result<Vec<Order>, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::OrderHistory { table, respond_to })
            .await
    }

    pub async fn snapshot(&self) -> Result<Snapshot, WorkflowError> {
        self.request(|respond_to| WorkflowRequest::Snapshot { respond_to })
            .await
    }
}
