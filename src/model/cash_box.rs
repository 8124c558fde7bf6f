//! Cash-box ("caja chica") sessions.
//!
//! A session is opened with an initial amount, collects income and expense movements,
//! and is closed with a counted final amount. Orders can only be created and paid while
//! a session is open.

use crate::model::{CashBoxId, MovementId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "Ingreso")]
    Income,
    #[serde(rename = "Egreso")]
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: MovementId,
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub concept: String,
    #[serde(default)]
    pub movement_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBox {
    pub id: CashBoxId,
    pub initial_amount: Decimal,
    #[serde(default)]
    pub final_amount: Option<Decimal>,
    #[serde(default)]
    pub opening_date: Option<String>,
    #[serde(default)]
    pub closing_date: Option<String>,
    #[serde(default)]
    pub additional_note: Option<String>,
    pub is_closed: bool,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub total_income: Decimal,
    #[serde(default)]
    pub total_expense: Decimal,
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default)]
    pub cash_movements: Vec<CashMovement>,
}

impl CashBox {
    /// Appends a movement and keeps the running totals in step.
    pub fn record(&mut self, movement: CashMovement) {
        match movement.movement_type {
            MovementType::Income => self.total_income += movement.amount,
            MovementType::Expense => self.total_expense += movement.amount,
        }
        self.current_balance = self.initial_amount + self.total_income - self.total_expense;
        self.cash_movements.push(movement);
    }

    /// Id for the next movement of this session.
    pub fn next_movement_id(&self) -> MovementId {
        MovementId(self.cash_movements.len() as u32 + 1)
    }
}

/// Body of `POST /smallbox`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCashBoxRequest {
    pub initial_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_note: Option<String>,
}

/// Body of `PATCH /smallbox/{id}/close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseCashBoxRequest {
    pub final_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_note: Option<String>,
}

/// Body of `POST /smallbox/cash-movement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovementRequest {
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub concept: String,
    pub small_box_id: CashBoxId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movements_update_balance() {
        let mut cash_box = CashBox {
            id: CashBoxId(1),
            initial_amount: Decimal::new(10000, 2),
            final_amount: None,
            opening_date: None,
            closing_date: None,
            additional_note: None,
            is_closed: false,
            user_id: UserId(1),
            user_name: None,
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            current_balance: Decimal::new(10000, 2),
            cash_movements: Vec::new(),
        };

        let id = cash_box.next_movement_id();
        cash_box.record(CashMovement {
            id,
            movement_type: MovementType::Income,
            amount: Decimal::new(3500, 2),
            concept: "Pago de pedido".into(),
            movement_date: None,
        });
        let id = cash_box.next_movement_id();
        cash_box.record(CashMovement {
            id,
            movement_type: MovementType::Expense,
            amount: Decimal::new(500, 2),
            concept: "Hielo".into(),
            movement_date: None,
        });

        assert_eq!(cash_box.total_income, Decimal::new(3500, 2));
        assert_eq!(cash_box.total_expense, Decimal::new(500, 2));
        assert_eq!(cash_box.current_balance, Decimal::new(13000, 2));
        assert_eq!(cash_box.cash_movements[1].id, MovementId(2));
    }

    #[test]
    fn movement_type_uses_backend_spelling() {
        let json = serde_json::to_string(&MovementType::Expense).unwrap();
        assert_eq!(json, "\"Egreso\"");
    }
}
