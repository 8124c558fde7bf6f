//! Dining tables and their occupancy.

use crate::model::{CurrentUser, OrderId, OrderStatus, TableId, UserId};
use serde::{Deserialize, Serialize};

/// A dining table as returned by the tables-with-orders listing.
///
/// The first group of fields is back-office configuration. The `is_occupied` ..
/// `current_order_is_paid` group is transient occupancy computed by the backend from
/// unpaid orders, and projected locally by the workflow between refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub lounge_id: Option<u32>,
    #[serde(default)]
    pub lounge_name: Option<String>,

    #[serde(default)]
    pub is_occupied: bool,
    #[serde(default)]
    pub occupied_by: Option<String>,
    #[serde(default)]
    pub occupied_by_user_id: Option<UserId>,
    #[serde(default)]
    pub current_order_id: Option<OrderId>,
    #[serde(default)]
    pub current_order_status: Option<OrderStatus>,
    #[serde(default)]
    pub current_order_is_paid: Option<bool>,
}

fn default_active() -> bool {
    true
}

/// Who may work on a table, from the point of view of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Not occupied, or occupied without a known owner.
    Free,
    /// Occupied by the asking user.
    Mine { current_order: Option<OrderId> },
    /// Occupied by somebody else.
    Taken { by: String },
}

/// Grid colouring of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Available,
    InProcess,
    Selected,
}

impl Table {
    /// Creates an unoccupied, active table.
    pub fn new(id: TableId, name: impl Into<String>, environment: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            environment: environment.into(),
            capacity,
            is_active: true,
            lounge_id: None,
            lounge_name: None,
            is_occupied: false,
            occupied_by: None,
            occupied_by_user_id: None,
            current_order_id: None,
            current_order_status: None,
            current_order_is_paid: None,
        }
    }

    /// Lounge name when the table belongs to one, its environment otherwise.
    pub fn location(&self) -> &str {
        self.lounge_name.as_deref().unwrap_or(&self.environment)
    }

    pub fn availability(&self, user: UserId) -> Availability {
        if !self.is_occupied {
            return Availability::Free;
        }
        match self.occupied_by_user_id {
            Some(owner) if owner == user => Availability::Mine {
                current_order: self.current_order_id,
            },
            Some(_) => Availability::Taken {
                by: self
                    .occupied_by
                    .clone()
                    .unwrap_or_else(|| "otro usuario".to_string()),
            },
            None => Availability::Free,
        }
    }

    /// An order is linked and has not been reported as paid.
    pub fn has_unpaid_order(&self) -> bool {
        self.current_order_id.is_some() && self.current_order_is_paid != Some(true)
    }

    /// Free for `user` to start a new occupation.
    pub fn is_available_to(&self, user: UserId) -> bool {
        match self.availability(user) {
            Availability::Free => true,
            Availability::Mine { .. } => !self.has_unpaid_order(),
            Availability::Taken { .. } => false,
        }
    }

    pub fn status_for(&self, user: UserId, selected: Option<TableId>) -> TableStatus {
        if selected == Some(self.id) {
            return TableStatus::Selected;
        }
        match self.availability(user) {
            Availability::Taken { .. } => TableStatus::InProcess,
            Availability::Mine { .. } if self.has_unpaid_order() => TableStatus::InProcess,
            _ => TableStatus::Available,
        }
    }

    /// Marks the table as being served by `user`.
    pub fn occupy(&mut self, user: &CurrentUser) {
        self.is_occupied = true;
        self.occupied_by = Some(user.name.clone());
        self.occupied_by_user_id = Some(user.id);
    }

    /// Marks the table as served by `user` with `order` pending payment.
    pub fn attach_order(&mut self, user: &CurrentUser, order: OrderId) {
        self.occupy(user);
        self.current_order_id = Some(order);
        self.current_order_status = Some(OrderStatus::Pending);
        self.current_order_is_paid = Some(false);
    }

    /// Clears every occupancy field.
    pub fn release(&mut self) {
        self.is_occupied = false;
        self.occupied_by = None;
        self.occupied_by_user_id = None;
        self.current_order_id = None;
        self.current_order_status = None;
        self.current_order_is_paid = None;
    }
}

/// Query for the tables-with-orders listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFilter {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub lounge_id: Option<u32>,
    pub is_active: Option<bool>,
}

/// One page of tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesPage {
    pub tables: Vec<Table>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}
