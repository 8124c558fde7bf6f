//! # Order-Taking Workflow
//!
//! The controller of the order-taking screen and the actor that hosts it.
//!
//! - [`WorkflowController`]: the state machine (tables, cart, orders, settlement)
//! - [`WorkflowActor`] / [`WorkflowHandle`]: one task owning the controller, with the
//!   browsing-only board poll and the notice channel
//! - [`Cart`], [`TableBoard`], [`Bill`]: the data the controller keeps between calls
//!
//! ```rust,ignore
//! let controller = WorkflowController::new(user, Collaborators::from_backend(backend), settings);
//! let (actor, workflow) = WorkflowActor::new(controller);
//! tokio::spawn(actor.run());
//!
//! if let Selection::NeedsConfirmation(_) = workflow.select_table(TableId(3)).await? {
//!     workflow.confirm_table().await?;
//! }
//! workflow.add_to_cart(ceviche).await?;
//! let order = workflow.submit_order().await?;
//! ```

pub mod actor;
pub mod bill;
pub mod board;
pub mod cart;
pub mod controller;
pub mod error;
pub mod notice;

pub use actor::{WorkflowActor, WorkflowHandle, WorkflowRequest};
pub use bill::{Bill, BillLine, Settlement};
pub use board::{TableBoard, TableView};
pub use cart::{Cart, CartItem};
pub use controller::{Selection, Snapshot, WorkflowController, WorkflowSettings, WorkflowState};
pub use error::{SettlementReport, SettlementStep, WorkflowError};
pub use notice::{Notice, NoticeLevel};
