//! # Order Desk
//!
//! > **The order-taking workflow of a restaurant point of sale.**
//!
//! A cashier picks a table from the grid, builds a cart, sends it to the kitchen as an
//! order and later settles every unpaid order of the table in one payment. Orders and
//! payments are only accepted while a cash box (caja chica) is open.
//!
//! ## Architecture Notes
//!
//! ### 1. One owner for workflow state
//! The [`WorkflowController`](workflow::WorkflowController) is a plain state machine.
//! The [`WorkflowActor`](workflow::WorkflowActor) runs it in one Tokio task and applies
//! requests sequentially, so no locks guard the cart, the bill or the table grid.
//!
//! ### 2. Narrow collaborators
//! The workflow only sees the traits in [`api`]. The REST service
//! ([`HttpBackend`](api::HttpBackend)), the in-process backend
//! ([`MemoryBackend`](backend::MemoryBackend)) and the scripted
//! [`MockBackend`](api::MockBackend) all implement them.
//!
//! ### 3. Typed errors per layer
//! [`FrameworkError`](framework::FrameworkError), [`BackendError`](backend::BackendError),
//! [`ApiError`](api::ApiError) and [`WorkflowError`](workflow::WorkflowError) are
//! `thiserror` enums. A partial settlement is an error that carries a
//! [`SettlementReport`](workflow::SettlementReport) naming what was paid.
//!
//! ### 4. Observability
//! `tracing` everywhere, with ids as structured fields. See [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`model`] - tables, orders, cash boxes, catalog; the REST wire types
//! - [`api`] - collaborator traits, HTTP client, mock
//! - [`framework`] - the generic resource actor behind the in-memory backend
//! - [`backend`] - the in-memory backend with the restaurant's rules
//! - [`workflow`] - the controller, its actor and notices
//! - [`lifecycle`] - startup, shutdown and tracing setup
//! - [`config`] - `ORDER_DESK_*` environment variables
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ORDER_DESK_BACKEND=http ORDER_DESK_API_TOKEN=... cargo run
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod workflow;
