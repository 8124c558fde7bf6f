//! Type-safe identifiers.
//!
//! The backend uses integer identity columns everywhere. Each resource gets its own
//! newtype so a `TableId` cannot be passed where an `OrderId` is expected. On the wire
//! they are plain JSON numbers.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

typed_id!(
    /// Identifier of a dining table.
    TableId,
    "table"
);
typed_id!(
    /// Identifier of an order.
    OrderId,
    "order"
);
typed_id!(
    /// Identifier of a cash-box session.
    CashBoxId,
    "cashbox"
);
typed_id!(
    /// Identifier of a cash movement inside a session.
    MovementId,
    "movement"
);
typed_id!(ProductId, "product");
typed_id!(UserId, "user");
typed_id!(PaymentMethodId, "payment_method");
