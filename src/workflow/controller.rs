//! # Order-Taking Workflow
//!
//! `WorkflowController` is the state machine behind the order-taking screen:
//!
//! ```text
//!             select_table / confirm_table
//!   Browsing ------------------------------> TableSelected
//!      ^  ^                                     |      |
//!      |  +------ submit_order / leave_table ---+      | request_payment
//!      |                                               v
//!      +---------------- confirm_payment ------- PaymentInProgress
//!                                                  (cancel_payment goes back)
//! ```
//!
//! It owns the cart, the bill and a local projection of the table grid. Every backend
//! interaction goes through [`Collaborators`], and nothing is retried; a failed call
//! leaves the state as it was, except where an operation documents otherwise.
//!
//! The controller is plain async code with `&mut self` methods. Concurrency and
//! periodic refresh live in [`WorkflowActor`](crate::workflow::WorkflowActor).

use crate::api::{ApiError, Collaborators};
use crate::model::{
    Availability, CashBox, Category, CreateOrderRequest, CurrentUser, Lounge, Order,
    OrderFilter, OrderId,
    OrderStatus, PaymentData, PaymentMethod, PaymentMethodId, Product, ProductFilter,
    ProductId, TableFilter, TableId, UpdateOrderRequest,
};
use crate::workflow::{
    Bill, Cart, CartItem, Settlement, SettlementReport, SettlementStep, TableBoard, TableView,
    WorkflowError,
};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Orders fetched per page when collecting a table's unpaid orders.
const UNPAID_PAGE_SIZE: u32 = 50;

/// Orders shown by the order history.
const HISTORY_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Board refresh period while browsing.
    pub poll_interval: Duration,
    /// Tables per grid page.
    pub page_size: u32,
    /// Payment method sent with new orders. The real one is chosen at payment time.
    pub placeholder_payment_method: PaymentMethodId,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            page_size: 10,
            placeholder_payment_method: PaymentMethodId(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Browsing,
    TableSelected {
        table: TableId,
        /// The unpaid order the table was resumed with, if any.
        current_order: Option<Order>,
    },
    PaymentInProgress {
        table: TableId,
        bill: Bill,
    },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Browsing => "browsing",
            WorkflowState::TableSelected { .. } => "a table is selected",
            WorkflowState::PaymentInProgress { .. } => "a payment is in progress",
        }
    }

    pub fn is_browsing(&self) -> bool {
        matches!(self, WorkflowState::Browsing)
    }

    /// The table being worked on, if any.
    pub fn table(&self) -> Option<TableId> {
        match self {
            WorkflowState::Browsing => None,
            WorkflowState::TableSelected { table, .. }
            | WorkflowState::PaymentInProgress { table, .. } => Some(*table),
        }
    }
}

/// Outcome of [`WorkflowController::select_table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The user's own table with an unpaid order, entered directly.
    Resumed { table: TableId, order: Order },
    /// A free table; [`confirm_table`](WorkflowController::confirm_table) or
    /// [`cancel_confirmation`](WorkflowController::cancel_confirmation) must follow.
    NeedsConfirmation(TableId),
}

/// Read-only view of the workflow for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub user: CurrentUser,
    pub state: WorkflowState,
    pub pending_confirmation: Option<TableId>,
    pub tables: Vec<TableView>,
    pub total_tables: u32,
    pub cart: Vec<CartItem>,
    pub cart_total: Decimal,
}

pub struct WorkflowController {
    user: CurrentUser,
    api: Collaborators,
    settings: WorkflowSettings,
    state: WorkflowState,
    pending: Option<TableId>,
    board: TableBoard,
    cart: Cart,
    refresh_failure: Option<String>,
}

impl WorkflowController {
    pub fn new(user: CurrentUser, api: Collaborators, settings: WorkflowSettings) -> Self {
        let board = TableBoard::new(TableFilter {
            page: Some(1),
            page_size: Some(settings.page_size),
            ..Default::default()
        });
        Self {
            user,
            api,
            settings,
            state: WorkflowState::Browsing,
            pending: None,
            board,
            cart: Cart::new(),
            refresh_failure: None,
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn pending_confirmation(&self) -> Option<TableId> {
        self.pending
    }

    pub fn board(&self) -> &TableBoard {
        &self.board
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The board refresh that failed after the last submission or payment, if any.
    /// Taking it clears it.
    pub fn take_refresh_failure(&mut self) -> Option<String> {
        self.refresh_failure.take()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            user: self.user.clone(),
            state: self.state.clone(),
            pending_confirmation: self.pending,
            tables: self.board.views(&self.user, self.state.table()),
            total_tables: self.board.total(),
            cart: self.cart.items().to_vec(),
            cart_total: self.cart.total(),
        }
    }

    // ---------------------------------------------------------------------
    // Tables
    // ---------------------------------------------------------------------

    #[instrument(skip(self), fields(user = %self.user.id))]
    pub async fn select_table(&mut self, id: TableId) -> Result<Selection, WorkflowError> {
        self.require_browsing("select a table")?;
        let table = self.board.get(id).ok_or(WorkflowError::UnknownTable(id))?;

        match table.availability(self.user.id) {
            Availability::Taken { by } => {
                warn!(table = %id, by = %by, "Table is served by another user");
                Err(WorkflowError::TableTaken { table: id, by })
            }
            Availability::Mine {
                current_order: Some(order_id),
            } => {
                let order = self.api.orders.get_order(order_id).await?;
                self.pending = None;
                self.cart.clear();
                self.state = WorkflowState::TableSelected {
                    table: id,
                    current_order: Some(order.clone()),
                };
                info!(table = %id, order = %order_id, "Table resumed");
                Ok(Selection::Resumed { table: id, order })
            }
            _ => {
                self.pending = Some(id);
                debug!(table = %id, "Awaiting confirmation");
                Ok(Selection::NeedsConfirmation(id))
            }
        }
    }

    /// Starts serving the table awaiting confirmation.
    ///
    /// The table is checked again against the current board, which may have been
    /// refreshed since it was selected.
    #[instrument(skip(self))]
    pub fn confirm_table(&mut self) -> Result<TableId, WorkflowError> {
        self.require_browsing("confirm a table")?;
        let id = self.pending.take().ok_or(WorkflowError::InvalidState {
            operation: "confirm a table",
            state: "no table awaits confirmation",
        })?;
        let table = self.board.get(id).ok_or(WorkflowError::UnknownTable(id))?;
        if let Availability::Taken { by } = table.availability(self.user.id) {
            warn!(table = %id, by = %by, "Table was taken before confirmation");
            return Err(WorkflowError::TableTaken { table: id, by });
        }
        self.board.mark_occupied(id, &self.user);
        self.cart.clear();
        self.state = WorkflowState::TableSelected {
            table: id,
            current_order: None,
        };
        info!(table = %id, "Table selected");
        Ok(id)
    }

    /// Forgets the table awaiting confirmation. Returns it, if there was one.
    pub fn cancel_confirmation(&mut self) -> Option<TableId> {
        self.pending.take()
    }

    /// Back to the grid, dropping the cart.
    #[instrument(skip(self))]
    pub fn leave_table(&mut self) -> Result<TableId, WorkflowError> {
        let table = self.selected_table("leave the table")?;
        self.cart.clear();
        self.state = WorkflowState::Browsing;
        info!(table = %table, "Back to tables");
        Ok(table)
    }

    /// Reloads the board. On failure the previous board is kept.
    #[instrument(skip(self))]
    pub async fn refresh_tables(&mut self) -> Result<(), WorkflowError> {
        let page = self.api.tables.tables_with_orders(self.board.filter()).await?;
        debug!(tables = page.tables.len(), total = page.total, "Board refreshed");
        self.board.replace(page);
        Ok(())
    }

    /// Changes the grid page or lounge and reloads the board.
    pub async fn set_table_filter(&mut self, mut filter: TableFilter) -> Result<(), WorkflowError> {
        filter.page_size = filter.page_size.or(Some(self.settings.page_size));
        self.board.set_filter(filter);
        self.refresh_tables().await
    }

    // ---------------------------------------------------------------------
    // Cart
    // ---------------------------------------------------------------------

    /// Adds one unit of `product`. Returns the item's new quantity.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<u32, WorkflowError> {
        self.selected_table("add to the cart")?;
        Ok(self.cart.add(product))
    }

    pub fn update_quantity(&mut self, product: ProductId, quantity: u32) -> Result<(), WorkflowError> {
        self.selected_table("change the cart")?;
        self.cart.set_quantity(product, quantity)
    }

    pub fn adjust_quantity(&mut self, product: ProductId, delta: i32) -> Result<u32, WorkflowError> {
        self.selected_table("change the cart")?;
        self.cart.adjust(product, delta)
    }

    pub fn remove_from_cart(&mut self, product: ProductId) -> Result<CartItem, WorkflowError> {
        self.selected_table("change the cart")?;
        self.cart.remove(product)
    }

    /// Sends the cart as one new order for the selected table.
    ///
    /// Nothing is created unless a cash box is open. On success the cart is cleared,
    /// the table is shown as occupied with the new order, and the workflow returns to
    /// browsing. The board refresh that follows does not undo the submission when it
    /// fails; see [`take_refresh_failure`](Self::take_refresh_failure).
    #[instrument(skip(self), fields(user = %self.user.id))]
    pub async fn submit_order(&mut self) -> Result<Order, WorkflowError> {
        let table = self.selected_table("submit an order")?;
        if self.cart.is_empty() {
            return Err(WorkflowError::EmptyCart);
        }
        self.ensure_cash_box().await?;

        let request = CreateOrderRequest {
            table_id: table,
            payment_method_id: self.settings.placeholder_payment_method,
            worker_id: None,
            customer_name: None,
            order_type: None,
            observations: String::new(),
            discount: None,
            tax: None,
            order_details: self.cart.order_details(),
        };
        debug!(?request, "Creating order");
        let order = self.api.orders.create_order(&request).await?;
        info!(table = %table, order = %order.id, total = %order.total, "Order created");

        self.cart.clear();
        self.board.attach_order(table, &self.user, order.id);
        self.state = WorkflowState::Browsing;
        self.refresh_after("order submission").await;
        Ok(order)
    }

    // ---------------------------------------------------------------------
    // Payment
    // ---------------------------------------------------------------------

    /// Loads every unpaid order of `table` into a bill.
    #[instrument(skip(self), fields(user = %self.user.id))]
    pub async fn request_payment(&mut self, table: TableId) -> Result<Bill, WorkflowError> {
        match &self.state {
            WorkflowState::Browsing => {}
            WorkflowState::TableSelected { table: selected, .. } if *selected == table => {}
            other => {
                return Err(WorkflowError::InvalidState {
                    operation: "request a payment",
                    state: other.name(),
                })
            }
        }
        let on_board = self.board.get(table).ok_or(WorkflowError::UnknownTable(table))?;
        if let Availability::Taken { by } = on_board.availability(self.user.id) {
            return Err(WorkflowError::TableTaken { table, by });
        }

        let orders = self.unpaid_orders(table).await?;
        if orders.is_empty() {
            return Err(WorkflowError::NothingToPay(table));
        }
        let bill = Bill::from_orders(table, orders);
        info!(table = %table, orders = bill.orders.len(), total = %bill.total, "Payment requested");
        self.pending = None;
        self.state = WorkflowState::PaymentInProgress {
            table,
            bill: bill.clone(),
        };
        Ok(bill)
    }

    /// Closes the payment and returns to the table.
    pub fn cancel_payment(&mut self) -> Result<TableId, WorkflowError> {
        let WorkflowState::PaymentInProgress { table, bill } = &self.state else {
            return Err(WorkflowError::InvalidState {
                operation: "cancel a payment",
                state: self.state.name(),
            });
        };
        let table = *table;
        let current_order = bill.orders.last().cloned();
        self.state = WorkflowState::TableSelected {
            table,
            current_order,
        };
        Ok(table)
    }

    /// Settles every unpaid order of the table being paid.
    ///
    /// Each order is updated with the chosen payment method and customer, then marked
    /// as paid, strictly one after the other. When order N fails, orders before it stay
    /// paid, the workflow stays in payment with the remaining orders, and the error
    /// carries a [`SettlementReport`].
    #[instrument(skip(self, payment), fields(user = %self.user.id, method = %payment.payment_method_id))]
    pub async fn confirm_payment(&mut self, payment: PaymentData) -> Result<Settlement, WorkflowError> {
        let table = match &self.state {
            WorkflowState::PaymentInProgress { table, .. } => *table,
            other => {
                return Err(WorkflowError::InvalidState {
                    operation: "confirm a payment",
                    state: other.name(),
                })
            }
        };
        self.ensure_cash_box().await?;

        let orders = self.unpaid_orders(table).await?;
        if orders.is_empty() {
            return Err(WorkflowError::NothingToPay(table));
        }
        let customer_name = payment.customer();
        let mut settled = Vec::with_capacity(orders.len());

        for (index, order) in orders.iter().enumerate() {
            let update = UpdateOrderRequest {
                table_id: table,
                payment_method_id: payment.payment_method_id,
                status: OrderStatus::Completed,
                customer_name: customer_name.clone(),
                observations: None,
                is_paid: false,
            };
            let step = match self.api.orders.update_order(order.id, &update).await {
                Ok(_) => match self.api.orders.mark_as_paid(order.id).await {
                    Ok(_) => None,
                    Err(cause) => Some((SettlementStep::MarkPaid, cause)),
                },
                Err(cause) => Some((SettlementStep::Update, cause)),
            };
            if let Some((step, cause)) = step {
                let untouched = orders[index + 1..].iter().map(|o| o.id).collect();
                return Err(self.settlement_failed(table, &orders, settled, order.id, step, untouched, cause));
            }
            debug!(order = %order.id, "Order settled");
            settled.push(order.id);
        }

        let total = Bill::from_orders(table, orders).total;
        let change = (payment.amount - total).max(Decimal::ZERO);
        info!(table = %table, orders = settled.len(), total = %total, change = %change, "Table paid");

        self.board.release(table);
        self.cart.clear();
        self.pending = None;
        self.state = WorkflowState::Browsing;
        self.refresh_after("payment").await;

        Ok(Settlement {
            table,
            orders: settled,
            total,
            tendered: payment.amount,
            change,
            voucher_type: payment.voucher_type,
            customer_name,
        })
    }

    // ---------------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------------

    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<Product>, WorkflowError> {
        Ok(self.api.catalog.products(&filter).await?)
    }

    pub async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, WorkflowError> {
        Ok(self.api.catalog.payment_methods().await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, WorkflowError> {
        Ok(self.api.catalog.categories().await?)
    }

    pub async fn lounges(&self) -> Result<Vec<Lounge>, WorkflowError> {
        Ok(self.api.catalog.lounges().await?)
    }

    /// Every order of `table`, paid or not. Without a table, the most recent paid
    /// orders of the restaurant.
    #[instrument(skip(self))]
    pub async fn order_history(&self, table: Option<TableId>) -> Result<Vec<Order>, WorkflowError> {
        let filter = match table {
            Some(table) => OrderFilter {
                table_id: Some(table),
                ..Default::default()
            },
            None => OrderFilter {
                is_paid: Some(true),
                ..Default::default()
            },
        }
        .page(1, HISTORY_PAGE_SIZE);
        let page = self.api.orders.list_orders(&filter).await?;
        debug!(orders = page.orders.len(), total = page.total, "Order history loaded");
        Ok(page.orders)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn require_browsing(&self, operation: &'static str) -> Result<(), WorkflowError> {
        if self.state.is_browsing() {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }

    fn selected_table(&self, operation: &'static str) -> Result<TableId, WorkflowError> {
        match &self.state {
            WorkflowState::TableSelected { table, .. } => Ok(*table),
            other => Err(WorkflowError::InvalidState {
                operation,
                state: other.name(),
            }),
        }
    }

    /// Fresh check for an open cash box.
    async fn ensure_cash_box(&self) -> Result<CashBox, WorkflowError> {
        match self.api.cash_box.active_cash_box().await {
            Ok(Some(cash_box)) => Ok(cash_box),
            Ok(None) => {
                warn!("No open cash box");
                Err(WorkflowError::NoOpenCashBox)
            }
            Err(e) => Err(WorkflowError::CashBoxCheck(e)),
        }
    }

    /// All unpaid orders of `table`, across pages.
    async fn unpaid_orders(&self, table: TableId) -> Result<Vec<Order>, WorkflowError> {
        let mut orders = Vec::new();
        let mut fetched = 0usize;
        let mut page = 1;
        loop {
            let filter = OrderFilter::unpaid_for(table).page(page, UNPAID_PAGE_SIZE);
            let result = self.api.orders.list_orders(&filter).await?;
            let received = result.orders.len();
            fetched += received;
            orders.extend(
                result
                    .orders
                    .into_iter()
                    .filter(|order| !order.is_paid && order.table_id == table),
            );
            // Backends may cap the page size, so only the reported total ends the loop.
            if received == 0 || fetched >= result.total as usize {
                break;
            }
            page += 1;
        }
        Ok(orders)
    }

    async fn refresh_after(&mut self, operation: &str) {
        if let Err(e) = self.refresh_tables().await {
            warn!(error = %e, "Board refresh after {operation} failed");
            self.refresh_failure = Some(format!("Tables could not be refreshed after {operation}: {e}"));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn settlement_failed(
        &mut self,
        table: TableId,
        orders: &[Order],
        settled: Vec<OrderId>,
        failed: OrderId,
        step: SettlementStep,
        untouched: Vec<OrderId>,
        cause: ApiError,
    ) -> WorkflowError {
        warn!(table = %table, order = %failed, %step, error = %cause, settled = settled.len(), "Settlement stopped");
        let remaining = Bill::from_orders(table, orders.to_vec()).without(&settled);
        self.state = WorkflowState::PaymentInProgress {
            table,
            bill: remaining,
        };
        WorkflowError::Settlement(Box::new(SettlementReport {
            table,
            settled,
            failed,
            step,
            untouched,
            cause,
        }))
    }
}
