//! # In-Memory Backend
//!
//! `MemoryBackend` runs the restaurant backend inside the process: one
//! [`ResourceActor`](crate::framework::ResourceActor) per resource, wired through
//! context injection, plus a fixed catalog of products, categories, lounges and payment
//! methods.
//!
//! ```text
//!   tables actor  <---- orders actor ----> cash boxes actor
//!                   (table + box checks,
//!                    income on mark-paid)
//! ```
//!
//! It implements the same collaborator traits as
//! [`HttpBackend`](crate::api::HttpBackend), including the rules the workflow relies on:
//!
//! - an order can only be created against an existing, active table while a cash box
//!   is open;
//! - at most one cash box is open at a time;
//! - marking an order as paid records an income movement once, and repeating it is a
//!   no-op;
//! - the table grid derives occupancy from the latest unpaid order of each table.
//!
//! Each handle acts on behalf of one user ([`MemoryBackend::for_user`]), the way a
//! bearer token does for the REST service.

pub mod cash_box_actor;
pub mod error;
pub mod order_actor;
pub mod table_actor;

pub use error::BackendError;
pub use table_actor::{NewTable, TableUpdate};

use crate::api::{ApiError, ApiResult, CashBoxApi, CatalogApi, OrderApi, TableApi};
use crate::framework::ResourceClient;
use crate::model::{
    CashBox, CashBoxId, CashMovement, CashMovementRequest, Category, CloseCashBoxRequest,
    CreateOrderRequest, CurrentUser, Lounge, OpenCashBoxRequest, Order, OrderFilter, OrderId,
    OrdersPage, PaymentMethod, PaymentMethodId, Product, ProductFilter, ProductId, Table,
    TableFilter, TableId, TablesPage, UpdateOrderRequest,
};
use async_trait::async_trait;
use cash_box_actor::{CashBoxAction, OpenCashBox};
use order_actor::{OrderAction, OrderCreate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Reference data served by the in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub lounges: Vec<Lounge>,
    pub payment_methods: Vec<PaymentMethod>,
}

impl Catalog {
    /// A small menu and the usual payment methods.
    pub fn demo() -> Self {
        let products = vec![
            Product::new(ProductId(1), "Ceviche clasico", Decimal::new(1000, 2))
                .in_category(1, "Entradas"),
            Product::new(ProductId(2), "Causa limena", Decimal::new(1500, 2))
                .in_category(1, "Entradas"),
            Product::new(ProductId(3), "Lomo saltado", Decimal::new(2800, 2))
                .in_category(2, "Fondos"),
            Product::new(ProductId(4), "Aji de gallina", Decimal::new(2200, 2))
                .in_category(2, "Fondos"),
            Product::new(ProductId(5), "Chicha morada", Decimal::new(600, 2))
                .in_category(3, "Bebidas"),
            Product::new(ProductId(6), "Inca Kola", Decimal::new(500, 2))
                .in_category(3, "Bebidas"),
        ];
        let payment_methods = [(1, "Efectivo", false), (2, "Tarjeta", true), (3, "Yape", false)]
            .into_iter()
            .map(|(id, name, requires_authorization)| PaymentMethod {
                id: PaymentMethodId(id),
                name: name.to_string(),
                description: None,
                requires_authorization,
            })
            .collect();
        let categories = [(1, "Entradas"), (2, "Fondos"), (3, "Bebidas")]
            .into_iter()
            .map(|(id, name)| Category {
                id,
                name: name.to_string(),
                description: None,
                is_active: true,
                product_count: products.iter().filter(|p| p.category_id == id).count() as u32,
            })
            .collect();
        let lounges = [(1, "Salon", true), (2, "Terraza", true), (3, "Reservado", false)]
            .into_iter()
            .map(|(id, name, is_active)| Lounge {
                id,
                name: name.to_string(),
                is_active,
            })
            .collect();
        Self {
            products,
            categories,
            lounges,
            payment_methods,
        }
    }
}

/// Handle to the in-process backend, bound to one user.
#[derive(Clone)]
pub struct MemoryBackend {
    user: CurrentUser,
    tables: ResourceClient<Table>,
    orders: ResourceClient<Order>,
    cash_boxes: ResourceClient<CashBox>,
    catalog: Arc<Catalog>,
    /// Serializes "check no box is open, then open one".
    opening: Arc<Mutex<()>>,
}

impl MemoryBackend {
    /// Spawns the three actors and returns a handle for `user` plus the actor tasks.
    ///
    /// The actors stop once every handle (and every clone from [`for_user`](Self::for_user))
    /// has been dropped.
    pub fn spawn(user: CurrentUser, catalog: Catalog) -> (Self, Vec<JoinHandle<()>>) {
        let (table_actor, tables) = table_actor::new();
        let (cash_box_actor, cash_boxes) = cash_box_actor::new();
        let (order_actor, orders) = order_actor::new();

        let handles = vec![
            tokio::spawn(table_actor.run(())),
            tokio::spawn(cash_box_actor.run(())),
            tokio::spawn(order_actor.run((tables.clone(), cash_boxes.clone()))),
        ];

        let backend = Self {
            user,
            tables,
            orders,
            cash_boxes,
            catalog: Arc::new(catalog),
            opening: Arc::new(Mutex::new(())),
        };
        (backend, handles)
    }

    /// Another handle to the same data, acting as `user`.
    pub fn for_user(&self, user: CurrentUser) -> Self {
        Self {
            user,
            ..self.clone()
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub async fn add_table(&self, table: NewTable) -> ApiResult<Table> {
        Ok(self.tables.create(table).await?)
    }

    pub async fn update_table(&self, id: TableId, update: TableUpdate) -> ApiResult<Table> {
        Ok(self.tables.update(id, update).await?)
    }

    fn payment_method_name(&self, id: PaymentMethodId) -> Option<String> {
        self.catalog
            .payment_methods
            .iter()
            .find(|method| method.id == id)
            .map(|method| method.name.clone())
    }
}

fn paginate<T>(items: Vec<T>, page: Option<u32>, page_size: Option<u32>) -> (Vec<T>, u32, u32, u32) {
    let total = items.len() as u32;
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let skip = (page - 1).saturating_mul(page_size) as usize;
    let items = items.into_iter().skip(skip).take(page_size as usize).collect();
    (items, total, page, page_size)
}

#[async_trait]
impl CashBoxApi for MemoryBackend {
    async fn active_cash_box(&self) -> ApiResult<Option<CashBox>> {
        Ok(self.cash_boxes.list(Some(false)).await?.into_iter().next())
    }

    #[instrument(skip(self), fields(user = %self.user.id))]
    async fn open_cash_box(&self, request: &OpenCashBoxRequest) -> ApiResult<CashBox> {
        let _guard = self.opening.lock().await;
        if let Some(open) = self.active_cash_box().await? {
            return Err(BackendError::Conflict(format!("{} is already open", open.id)).into());
        }
        let cash_box = self
            .cash_boxes
            .create(OpenCashBox {
                request: request.clone(),
                user: self.user.clone(),
            })
            .await?;
        info!(cash_box = %cash_box.id, "Cash box opened");
        Ok(cash_box)
    }

    #[instrument(skip(self))]
    async fn close_cash_box(
        &self,
        id: CashBoxId,
        request: &CloseCashBoxRequest,
    ) -> ApiResult<CashBox> {
        Ok(self.cash_boxes.update(id, request.clone()).await?)
    }

    #[instrument(skip(self))]
    async fn record_movement(&self, request: &CashMovementRequest) -> ApiResult<CashMovement> {
        let action = CashBoxAction::Record {
            movement_type: request.movement_type,
            amount: request.amount,
            concept: request.concept.clone(),
        };
        Ok(self
            .cash_boxes
            .perform_action(request.small_box_id, action)
            .await?)
    }
}

#[async_trait]
impl OrderApi for MemoryBackend {
    async fn list_orders(&self, filter: &OrderFilter) -> ApiResult<OrdersPage> {
        let orders = self.orders.list(filter.clone()).await?;
        let (orders, total, page, page_size) = paginate(orders, filter.page, filter.page_size);
        Ok(OrdersPage {
            orders,
            total,
            page,
            page_size,
        })
    }

    async fn get_order(&self, id: OrderId) -> ApiResult<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, request), fields(user = %self.user.id, table = %request.table_id))]
    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<Order> {
        let params = OrderCreate {
            request: request.clone(),
            user: self.user.clone(),
            payment_method_name: self.payment_method_name(request.payment_method_id),
        };
        Ok(self.orders.create(params).await?)
    }

    async fn update_order(&self, id: OrderId, request: &UpdateOrderRequest) -> ApiResult<Order> {
        Ok(self.orders.update(id, request.clone()).await?)
    }

    async fn mark_as_paid(&self, id: OrderId) -> ApiResult<Order> {
        Ok(self.orders.perform_action(id, OrderAction::MarkPaid).await?)
    }
}

#[async_trait]
impl TableApi for MemoryBackend {
    async fn tables_with_orders(&self, filter: &TableFilter) -> ApiResult<TablesPage> {
        let tables = self.tables.list(filter.clone()).await?;
        let unpaid = self
            .orders
            .list(OrderFilter {
                is_paid: Some(false),
                ..Default::default()
            })
            .await?;

        // Orders are listed by id, so the last one per table wins.
        let mut latest: BTreeMap<TableId, Order> = BTreeMap::new();
        for order in unpaid {
            latest.insert(order.table_id, order);
        }

        let tables = tables
            .into_iter()
            .map(|mut table| {
                if let Some(order) = latest.get(&table.id) {
                    table.is_occupied = true;
                    table.occupied_by = order.user_name.clone();
                    table.occupied_by_user_id = order.user_id;
                    table.current_order_id = Some(order.id);
                    table.current_order_status = Some(order.status);
                    table.current_order_is_paid = Some(order.is_paid);
                }
                table
            })
            .collect();

        let (tables, total, page, page_size) = paginate(tables, filter.page, filter.page_size);
        Ok(TablesPage {
            tables,
            total,
            page,
            page_size,
        })
    }
}

#[async_trait]
impl CatalogApi for MemoryBackend {
    async fn products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
        let products: Vec<Product> = self
            .catalog
            .products
            .iter()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        match filter.page_size {
            Some(page_size) => Ok(paginate(products, filter.page, Some(page_size)).0),
            None => Ok(products),
        }
    }

    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        Ok(self.catalog.payment_methods.clone())
    }

    async fn categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.catalog.categories.clone())
    }

    async fn lounges(&self) -> ApiResult<Vec<Lounge>> {
        Ok(self
            .catalog
            .lounges
            .iter()
            .filter(|lounge| lounge.is_active)
            .cloned()
            .collect())
    }
}
