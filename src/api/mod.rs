//! # Collaborators
//!
//! The workflow never talks to a concrete backend. It sees four narrow traits, one per
//! backend area, and holds them as trait objects in [`Collaborators`]:
//!
//! - [`CashBoxApi`] - the open cash-box session and its movements
//! - [`OrderApi`] - order listing, creation, update and settlement
//! - [`TableApi`] - the table grid with occupancy
//! - [`CatalogApi`] - products, categories, lounges and payment methods
//!
//! Three implementations exist: [`HttpBackend`] (the REST service),
//! [`MemoryBackend`](crate::backend::MemoryBackend) (in-process actors) and
//! [`MockBackend`] (scripted expectations for tests).

pub mod error;
pub mod http;
pub mod mock;

pub use error::{ApiError, ApiResult};
pub use http::HttpBackend;
pub use mock::{Call, MockBackend};

use crate::model::{
    CashBox, CashBoxId, CashMovement, CashMovementRequest, CloseCashBoxRequest,
    CreateOrderRequest, OpenCashBoxRequest, Order, OrderFilter, OrderId, OrdersPage,
    Category, Lounge, PaymentMethod, Product, ProductFilter, TableFilter, TablesPage,
    UpdateOrderRequest,
};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CashBoxApi: Send + Sync {
    /// The open session of the current user, `None` when no session is open.
    async fn active_cash_box(&self) -> ApiResult<Option<CashBox>>;

    async fn open_cash_box(&self, request: &OpenCashBoxRequest) -> ApiResult<CashBox>;

    async fn close_cash_box(
        &self,
        id: CashBoxId,
        request: &CloseCashBoxRequest,
    ) -> ApiResult<CashBox>;

    async fn record_movement(&self, request: &CashMovementRequest) -> ApiResult<CashMovement>;
}

#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn list_orders(&self, filter: &OrderFilter) -> ApiResult<OrdersPage>;

    async fn get_order(&self, id: OrderId) -> ApiResult<Order>;

    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<Order>;

    async fn update_order(&self, id: OrderId, request: &UpdateOrderRequest) -> ApiResult<Order>;

    /// Flags the order as paid. The backend books the income in the open cash box.
    async fn mark_as_paid(&self, id: OrderId) -> ApiResult<Order>;
}

#[async_trait]
pub trait TableApi: Send + Sync {
    /// Tables with their occupancy derived from unpaid orders.
    async fn tables_with_orders(&self, filter: &TableFilter) -> ApiResult<TablesPage>;
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>>;

    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>>;

    /// Product categories, for filtering the product list.
    async fn categories(&self) -> ApiResult<Vec<Category>>;

    /// Active lounges, for filtering the table grid.
    async fn lounges(&self) -> ApiResult<Vec<Lounge>>;
}

/// Everything the workflow needs from one backend.
pub trait Backend: CashBoxApi + OrderApi + TableApi + CatalogApi {}

impl<B: CashBoxApi + OrderApi + TableApi + CatalogApi> Backend for B {}

/// The collaborators handed to a [`WorkflowController`](crate::workflow::WorkflowController).
#[derive(Clone)]
pub struct Collaborators {
    pub cash_box: Arc<dyn CashBoxApi>,
    pub orders: Arc<dyn OrderApi>,
    pub tables: Arc<dyn TableApi>,
    pub catalog: Arc<dyn CatalogApi>,
}

impl Collaborators {
    /// Uses one backend for every area.
    pub fn from_backend<B: Backend + 'static>(backend: Arc<B>) -> Self {
        Self {
            cash_box: backend.clone(),
            orders: backend.clone(),
            tables: backend.clone(),
            catalog: backend,
        }
    }
}
