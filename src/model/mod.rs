//! Domain and wire types shared by the backends and the workflow.
//!
//! Field names follow the REST backend (camelCase JSON); money is `Decimal`.

pub mod cash_box;
pub mod catalog;
pub mod ids;
pub mod order;
pub mod session;
pub mod table;

pub use cash_box::{
    CashBox, CashMovement, CashMovementRequest, CloseCashBoxRequest, MovementType,
    OpenCashBoxRequest,
};
pub use catalog::{
    CategoriesPage, Category, Lounge, LoungesPage, PaymentData, PaymentMethod,
    PaymentMethodsPage, Product, ProductFilter, ProductsPage, VoucherType,
};
pub use ids::{CashBoxId, MovementId, OrderId, PaymentMethodId, ProductId, TableId, UserId};
pub use order::{
    CreateOrderRequest, Order, OrderDetail, OrderFilter, OrderStatus, OrdersPage,
    UpdateOrderRequest,
};
pub use session::CurrentUser;
pub use table::{Availability, Table, TableFilter, TableStatus, TablesPage};
