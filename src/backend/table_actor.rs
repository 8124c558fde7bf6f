//! # Table Actor
//!
//! Holds the configured tables. Occupancy is not stored here; the backend derives it
//! from unpaid orders when the grid is listed.

use crate::backend::BackendError;
use crate::framework::{ActorEntity, ResourceActor, ResourceClient};
use crate::model::{Table, TableFilter, TableId};
use async_trait::async_trait;
use std::convert::Infallible;

/// Payload for adding a table.
#[derive(Debug, Clone)]
pub struct NewTable {
    pub name: String,
    pub environment: String,
    pub capacity: u32,
    pub lounge: Option<(u32, String)>,
}

impl NewTable {
    pub fn new(name: impl Into<String>, environment: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            environment: environment.into(),
            capacity,
            lounge: None,
        }
    }

    pub fn in_lounge(mut self, id: u32, name: impl Into<String>) -> Self {
        self.lounge = Some((id, name.into()));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableUpdate {
    pub capacity: Option<u32>,
    pub is_active: Option<bool>,
}

#[async_trait]
impl ActorEntity for Table {
    type Id = TableId;
    type Create = NewTable;
    type Update = TableUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Filter = TableFilter;
    type Context = ();
    type Error = BackendError;

    fn from_create_params(id: TableId, params: NewTable) -> Result<Self, BackendError> {
        if params.capacity == 0 {
            return Err(BackendError::Invalid("capacity must be positive".into()));
        }
        let mut table = Table::new(id, params.name, params.environment, params.capacity);
        if let Some((lounge_id, lounge_name)) = params.lounge {
            table.lounge_id = Some(lounge_id);
            table.lounge_name = Some(lounge_name);
        }
        Ok(table)
    }

    fn matches(&self, filter: &TableFilter) -> bool {
        filter.lounge_id.is_none_or(|id| self.lounge_id == Some(id))
            && filter.is_active.is_none_or(|active| self.is_active == active)
    }

    async fn on_update(&mut self, update: TableUpdate, _ctx: &()) -> Result<(), BackendError> {
        if let Some(capacity) = update.capacity {
            if capacity == 0 {
                return Err(BackendError::Invalid("capacity must be positive".into()));
            }
            self.capacity = capacity;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), BackendError> {
        match action {}
    }
}

/// Creates a new Table actor and its client.
pub fn new() -> (ResourceActor<Table>, ResourceClient<Table>) {
    ResourceActor::new(32)
}
