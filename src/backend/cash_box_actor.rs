//! # Cash Box Actor
//!
//! Cash-box sessions. Closing a session is the update operation; recording a movement
//! is a custom action.

use crate::backend::BackendError;
use crate::framework::{ActorEntity, ResourceActor, ResourceClient};
use crate::model::{
    CashBox, CashBoxId, CashMovement, CloseCashBoxRequest, CurrentUser, MovementType,
    OpenCashBoxRequest,
};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Payload for opening a session on behalf of `user`.
#[derive(Debug, Clone)]
pub struct OpenCashBox {
    pub request: OpenCashBoxRequest,
    pub user: CurrentUser,
}

#[derive(Debug, Clone)]
pub enum CashBoxAction {
    Record {
        movement_type: MovementType,
        amount: Decimal,
        concept: String,
    },
}

#[async_trait]
impl ActorEntity for CashBox {
    type Id = CashBoxId;
    type Create = OpenCashBox;
    type Update = CloseCashBoxRequest;
    type Action = CashBoxAction;
    type ActionResult = CashMovement;
    /// `Some(false)` lists open sessions only.
    type Filter = Option<bool>;
    type Context = ();
    type Error = BackendError;

    fn from_create_params(id: CashBoxId, params: OpenCashBox) -> Result<Self, BackendError> {
        let initial = params.request.initial_amount;
        if initial.is_sign_negative() {
            return Err(BackendError::Invalid(
                "initial amount cannot be negative".into(),
            ));
        }
        Ok(Self {
            id,
            initial_amount: initial,
            final_amount: None,
            opening_date: None,
            closing_date: None,
            additional_note: params.request.additional_note,
            is_closed: false,
            user_id: params.user.id,
            user_name: Some(params.user.name),
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            current_balance: initial,
            cash_movements: Vec::new(),
        })
    }

    fn matches(&self, is_closed: &Option<bool>) -> bool {
        is_closed.is_none_or(|closed| self.is_closed == closed)
    }

    async fn on_update(
        &mut self,
        request: CloseCashBoxRequest,
        _ctx: &(),
    ) -> Result<(), BackendError> {
        if self.is_closed {
            return Err(BackendError::Conflict(format!("{} is already closed", self.id)));
        }
        self.is_closed = true;
        self.final_amount = Some(request.final_amount);
        if request.additional_note.is_some() {
            self.additional_note = request.additional_note;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CashBoxAction,
        _ctx: &(),
    ) -> Result<CashMovement, BackendError> {
        match action {
            CashBoxAction::Record {
                movement_type,
                amount,
                concept,
            } => {
                if self.is_closed {
                    return Err(BackendError::Conflict(format!("{} is closed", self.id)));
                }
                if amount <= Decimal::ZERO {
                    return Err(BackendError::Invalid("amount must be positive".into()));
                }
                let movement = CashMovement {
                    id: self.next_movement_id(),
                    movement_type,
                    amount,
                    concept,
                    movement_date: None,
                };
                self.record(movement.clone());
                Ok(movement)
            }
        }
    }
}

/// Creates a new CashBox actor and its client.
pub fn new() -> (ResourceActor<CashBox>, ResourceClient<CashBox>) {
    ResourceActor::new(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(amount: i64) -> OpenCashBox {
        OpenCashBox {
            request: OpenCashBoxRequest {
                initial_amount: Decimal::new(amount, 2),
                additional_note: None,
            },
            user: CurrentUser::new(1, "Ana"),
        }
    }

    #[tokio::test]
    async fn closed_box_rejects_movements() {
        let (actor, client) = new();
        tokio::spawn(actor.run(()));

        let cash_box = client.create(open(10000)).await.unwrap();
        let movement = client
            .perform_action(
                cash_box.id,
                CashBoxAction::Record {
                    movement_type: MovementType::Income,
                    amount: Decimal::new(2000, 2),
                    concept: "Venta".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(movement.amount, Decimal::new(2000, 2));

        let closed = client
            .update(
                cash_box.id,
                CloseCashBoxRequest {
                    final_amount: Decimal::new(12000, 2),
                    additional_note: Some("Cuadre ok".into()),
                },
            )
            .await
            .unwrap();
        assert!(closed.is_closed);
        assert_eq!(closed.current_balance, Decimal::new(12000, 2));

        let err = client
            .perform_action(
                cash_box.id,
                CashBoxAction::Record {
                    movement_type: MovementType::Expense,
                    amount: Decimal::ONE,
                    concept: "Gas".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.entity_error::<BackendError>(),
            Some(BackendError::Conflict(_))
        ));
        assert!(client.list(Some(false)).await.unwrap().is_empty());
    }
}
