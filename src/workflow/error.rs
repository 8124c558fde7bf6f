//! Error types for the order-taking workflow.

use crate::api::ApiError;
use crate::model::{OrderId, ProductId, TableId};
use crate::workflow::NoticeLevel;
use std::fmt::Display;
use thiserror::Error;

/// The settlement step that failed for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStep {
    Update,
    MarkPaid,
}

impl Display for SettlementStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementStep::Update => f.write_str("update"),
            SettlementStep::MarkPaid => f.write_str("mark-paid"),
        }
    }
}

/// Outcome of a settlement that stopped part way.
///
/// Orders in `settled` are paid and stay paid. Orders in `untouched` were not sent to
/// the backend. `failed` may or may not have been updated, depending on `step`.
#[derive(Debug)]
pub struct SettlementReport {
    pub table: TableId,
    pub settled: Vec<OrderId>,
    pub failed: OrderId,
    pub step: SettlementStep,
    pub untouched: Vec<OrderId>,
    pub cause: ApiError,
}

impl Display for SettlementReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} orders settled on {}; {} failed at {}: {}",
            self.settled.len(),
            self.settled.len() + 1 + self.untouched.len(),
            self.table,
            self.failed,
            self.step,
            self.cause
        )
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No open cash box; open one before taking orders or payments")]
    NoOpenCashBox,

    #[error("{table} is being served by {by}")]
    TableTaken { table: TableId, by: String },

    #[error("No pending orders on {0}")]
    NothingToPay(TableId),

    #[error("The cart is empty")]
    EmptyCart,

    #[error("Invalid quantity {0}; quantities start at 1")]
    InvalidQuantity(i64),

    #[error("{0} is not in the cart")]
    NotInCart(ProductId),

    #[error("Unknown table {0}")]
    UnknownTable(TableId),

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The active cash box could not be queried.
    #[error("Cash box check failed: {0}")]
    CashBoxCheck(#[source] ApiError),

    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("Settlement incomplete: {0}")]
    Settlement(Box<SettlementReport>),

    #[error("Workflow closed")]
    Closed,
}

impl WorkflowError {
    /// Precondition failures are warnings; failures of the backend or the workflow
    /// task are errors.
    pub fn severity(&self) -> NoticeLevel {
        match self {
            WorkflowError::NoOpenCashBox
            | WorkflowError::TableTaken { .. }
            | WorkflowError::NothingToPay(_)
            | WorkflowError::EmptyCart
            | WorkflowError::InvalidQuantity(_)
            | WorkflowError::NotInCart(_)
            | WorkflowError::UnknownTable(_)
            | WorkflowError::InvalidState { .. } => NoticeLevel::Warning,
            WorkflowError::CashBoxCheck(_)
            | WorkflowError::Backend(_)
            | WorkflowError::Settlement(_)
            | WorkflowError::Closed => NoticeLevel::Error,
        }
    }

    /// The settlement report, when this is a partial settlement.
    pub fn settlement_report(&self) -> Option<&SettlementReport> {
        match self {
            WorkflowError::Settlement(report) => Some(&**report),
            _ => None,
        }
    }
}
