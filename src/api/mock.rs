//! # Mock Backend
//!
//! `MockBackend` implements every collaborator trait from a queue of scripted
//! expectations. Each call pops the next expectation, checks that it is for the same
//! operation and returns the scripted result. Every call is also recorded, so a test
//! can assert on the exact requests the workflow issued.
//!
//! | | MockBackend | MemoryBackend |
//! |---|---|---|
//! | **State** | None, answers are scripted | Real actors and rules |
//! | **Error injection** | `return_err` on any call | Only what the rules produce |
//! | **Use case** | Workflow decisions and call order | End-to-end flows |
//!
//! ```rust,ignore
//! let mock = MockBackend::new();
//! mock.expect_active_cash_box().return_ok(None);
//!
//! let err = controller.submit_order().await.unwrap_err();
//! assert!(matches!(err, WorkflowError::NoOpenCashBox));
//! assert_eq!(mock.calls(), vec![Call::ActiveCashBox]);
//! mock.verify();
//! ```

use crate::api::{ApiError, ApiResult, CashBoxApi, CatalogApi, OrderApi, TableApi};
use crate::model::{
    CashBox, CashBoxId, CashMovement, CashMovementRequest, CloseCashBoxRequest,
    CreateOrderRequest, OpenCashBoxRequest, Order, OrderFilter, OrderId, OrdersPage,
    Category, Lounge, PaymentMethod, Product, ProductFilter, TableFilter, TablesPage,
    UpdateOrderRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request received by the mock, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ActiveCashBox,
    OpenCashBox(OpenCashBoxRequest),
    CloseCashBox(CashBoxId, CloseCashBoxRequest),
    RecordMovement(CashMovementRequest),
    ListOrders(OrderFilter),
    GetOrder(OrderId),
    CreateOrder(CreateOrderRequest),
    UpdateOrder(OrderId, UpdateOrderRequest),
    MarkAsPaid(OrderId),
    TablesWithOrders(TableFilter),
    Products(ProductFilter),
    PaymentMethods,
    Categories,
    Lounges,
}

/// A scripted answer, tagged with the operation it answers.
enum Expectation {
    ActiveCashBox(ApiResult<Option<CashBox>>),
    OpenCashBox(ApiResult<CashBox>),
    CloseCashBox(ApiResult<CashBox>),
    RecordMovement(ApiResult<CashMovement>),
    ListOrders(ApiResult<OrdersPage>),
    GetOrder(ApiResult<Order>),
    CreateOrder(ApiResult<Order>),
    UpdateOrder(ApiResult<Order>),
    MarkAsPaid(ApiResult<Order>),
    TablesWithOrders(ApiResult<TablesPage>),
    Products(ApiResult<Vec<Product>>),
    PaymentMethods(ApiResult<Vec<PaymentMethod>>),
    Categories(ApiResult<Vec<Category>>),
    Lounges(ApiResult<Vec<Lounge>>),
}

impl Expectation {
    fn name(&self) -> &'static str {
        match self {
            Expectation::ActiveCashBox(_) => "active_cash_box",
            Expectation::OpenCashBox(_) => "open_cash_box",
            Expectation::CloseCashBox(_) => "close_cash_box",
            Expectation::RecordMovement(_) => "record_movement",
            Expectation::ListOrders(_) => "list_orders",
            Expectation::GetOrder(_) => "get_order",
            Expectation::CreateOrder(_) => "create_order",
            Expectation::UpdateOrder(_) => "update_order",
            Expectation::MarkAsPaid(_) => "mark_as_paid",
            Expectation::TablesWithOrders(_) => "tables_with_orders",
            Expectation::Products(_) => "products",
            Expectation::PaymentMethods(_) => "payment_methods",
            Expectation::Categories(_) => "categories",
            Expectation::Lounges(_) => "lounges",
        }
    }
}

#[derive(Default)]
struct Script {
    expectations: VecDeque<Expectation>,
    calls: Vec<Call>,
}

/// A backend answering from a queue of expectations.
///
/// Clones share the same queue and call log, so one clone can be handed to the
/// workflow while the test keeps another to script and inspect it.
#[derive(Clone, Default)]
pub struct MockBackend {
    script: Arc<Mutex<Script>>,
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<R> {
    script: Arc<Mutex<Script>>,
    wrap: fn(ApiResult<R>) -> Expectation,
}

impl<R> ExpectationBuilder<R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, result: ApiResult<R>) {
        let expectation = (self.wrap)(result);
        lock(&self.script).expectations.push_back(expectation);
    }
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}

macro_rules! expect_fn {
    ($(#[$meta:meta])* $method:ident, $variant:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $method(&self) -> ExpectationBuilder<$ty> {
            ExpectationBuilder {
                script: self.script.clone(),
                wrap: Expectation::$variant,
            }
        }
    };
}

/// Pops the next expectation, which must be of variant `$variant`.
macro_rules! answer {
    ($self:ident, $call:expr, $variant:ident) => {{
        let mut script = lock(&$self.script);
        let call = $call;
        let next = script.expectations.pop_front();
        match next {
            Some(Expectation::$variant(result)) => {
                script.calls.push(call);
                result
            }
            Some(other) => {
                let expected = other.name();
                drop(script);
                panic!("Unexpected call {call:?}, next expectation is {expected}")
            }
            None => {
                drop(script);
                panic!("Unexpected call {call:?}, no expectations left")
            }
        }
    }};
}

impl MockBackend {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    expect_fn!(expect_active_cash_box, ActiveCashBox, Option<CashBox>);
    expect_fn!(expect_open_cash_box, OpenCashBox, CashBox);
    expect_fn!(expect_close_cash_box, CloseCashBox, CashBox);
    expect_fn!(expect_record_movement, RecordMovement, CashMovement);
    expect_fn!(expect_list_orders, ListOrders, OrdersPage);
    expect_fn!(expect_get_order, GetOrder, Order);
    expect_fn!(expect_create_order, CreateOrder, Order);
    expect_fn!(expect_update_order, UpdateOrder, Order);
    expect_fn!(expect_mark_as_paid, MarkAsPaid, Order);
    expect_fn!(
        /// Expects a board load. Scripts one page of tables.
        expect_tables_with_orders,
        TablesWithOrders,
        TablesPage
    );
    expect_fn!(expect_products, Products, Vec<Product>);
    expect_fn!(expect_payment_methods, PaymentMethods, Vec<PaymentMethod>);
    expect_fn!(expect_categories, Categories, Vec<Category>);
    expect_fn!(expect_lounges, Lounges, Vec<Lounge>);

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.script).calls.clone()
    }

    /// Number of scripted answers not consumed yet.
    pub fn pending(&self) -> usize {
        lock(&self.script).expectations.len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let script = lock(&self.script);
        if !script.expectations.is_empty() {
            let remaining: Vec<_> = script.expectations.iter().map(Expectation::name).collect();
            panic!("Not all expectations were met. Remaining: {remaining:?}");
        }
    }
}

#[async_trait]
impl CashBoxApi for MockBackend {
    async fn active_cash_box(&self) -> ApiResult<Option<CashBox>> {
        answer!(self, Call::ActiveCashBox, ActiveCashBox)
    }

    async fn open_cash_box(&self, request: &OpenCashBoxRequest) -> ApiResult<CashBox> {
        answer!(self, Call::OpenCashBox(request.clone()), OpenCashBox)
    }

    async fn close_cash_box(
        &self,
        id: CashBoxId,
        request: &CloseCashBoxRequest,
    ) -> ApiResult<CashBox> {
        answer!(self, Call::CloseCashBox(id, request.clone()), CloseCashBox)
    }

    async fn record_movement(&self, request: &CashMovementRequest) -> ApiResult<CashMovement> {
        answer!(self, Call::RecordMovement(request.clone()), RecordMovement)
    }
}

#[async_trait]
impl OrderApi for MockBackend {
    async fn list_orders(&self, filter: &OrderFilter) -> ApiResult<OrdersPage> {
        answer!(self, Call::ListOrders(filter.clone()), ListOrders)
    }

    async fn get_order(&self, id: OrderId) -> ApiResult<Order> {
        answer!(self, Call::GetOrder(id), GetOrder)
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<Order> {
        answer!(self, Call::CreateOrder(request.clone()), CreateOrder)
    }

    async fn update_order(&self, id: OrderId, request: &UpdateOrderRequest) -> ApiResult<Order> {
        answer!(self, Call::UpdateOrder(id, request.clone()), UpdateOrder)
    }

    async fn mark_as_paid(&self, id: OrderId) -> ApiResult<Order> {
        answer!(self, Call::MarkAsPaid(id), MarkAsPaid)
    }
}

#[async_trait]
impl TableApi for MockBackend {
    async fn tables_with_orders(&self, filter: &TableFilter) -> ApiResult<TablesPage> {
        answer!(self, Call::TablesWithOrders(filter.clone()), TablesWithOrders)
    }
}

#[async_trait]
impl CatalogApi for MockBackend {
    async fn products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
        answer!(self, Call::Products(filter.clone()), Products)
    }

    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        answer!(self, Call::PaymentMethods, PaymentMethods)
    }

    async fn categories(&self) -> ApiResult<Vec<Category>> {
        answer!(self, Call::Categories, Categories)
    }

    async fn lounges(&self) -> ApiResult<Vec<Lounge>> {
        answer!(self, Call::Lounges, Lounges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentMethodId;

    #[tokio::test]
    async fn answers_in_order_and_records_calls() {
        let mock = MockBackend::new();
        mock.expect_active_cash_box().return_ok(None);
        mock.expect_payment_methods().return_ok(vec![PaymentMethod {
            id: PaymentMethodId(1),
            name: "Efectivo".into(),
            description: None,
            requires_authorization: false,
        }]);
        mock.expect_get_order()
            .return_err(ApiError::NotFound("order 9".into()));

        assert!(mock.active_cash_box().await.unwrap().is_none());
        assert_eq!(mock.payment_methods().await.unwrap().len(), 1);
        assert!(matches!(
            mock.get_order(OrderId(9)).await,
            Err(ApiError::NotFound(_))
        ));

        assert_eq!(
            mock.calls(),
            vec![Call::ActiveCashBox, Call::PaymentMethods, Call::GetOrder(OrderId(9))]
        );
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected call")]
    async fn mismatched_call_panics() {
        let mock = MockBackend::new();
        mock.expect_active_cash_box().return_ok(None);
        let _ = mock.tables_with_orders(&TableFilter::default()).await;
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn verify_reports_leftovers() {
        let mock = MockBackend::new();
        mock.expect_list_orders().return_ok(OrdersPage {
            orders: Vec::new(),
            total: 0,
            page: 1,
            page_size: 10,
        });
        mock.verify();
    }
}
