//! Local projection of the table grid.
//!
//! The board is replaced wholesale by every refresh. Between refreshes the workflow
//! patches it with what it just did (occupied a table, attached an order, settled a
//! bill) so the grid reflects the user's own actions immediately.

use crate::model::{CurrentUser, OrderId, Table, TableFilter, TableId, TableStatus, TablesPage};

/// One table as the grid shows it to the current user.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub table: Table,
    pub status: TableStatus,
}

#[derive(Debug, Clone, Default)]
pub struct TableBoard {
    tables: Vec<Table>,
    filter: TableFilter,
    total: u32,
}

impl TableBoard {
    pub fn new(filter: TableFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn filter(&self) -> &TableFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: TableFilter) {
        self.filter = filter;
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Total number of tables matching the filter, across pages.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn replace(&mut self, page: TablesPage) {
        self.total = page.total;
        self.tables = page.tables;
    }

    pub fn get(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|table| table.id == id)
    }

    fn get_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| table.id == id)
    }

    pub fn mark_occupied(&mut self, id: TableId, user: &CurrentUser) {
        if let Some(table) = self.get_mut(id) {
            table.occupy(user);
        }
    }

    pub fn attach_order(&mut self, id: TableId, user: &CurrentUser, order: OrderId) {
        if let Some(table) = self.get_mut(id) {
            table.attach_order(user, order);
        }
    }

    pub fn release(&mut self, id: TableId) {
        if let Some(table) = self.get_mut(id) {
            table.release();
        }
    }

    pub fn views(&self, user: &CurrentUser, selected: Option<TableId>) -> Vec<TableView> {
        self.tables
            .iter()
            .map(|table| TableView {
                table: table.clone(),
                status: table.status_for(user.id, selected),
            })
            .collect()
    }
}
