//! # Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the tasks of the order desk.
//!
//! ```text
//!   OrderDesk
//!     |- WorkflowActor (owns WorkflowController)
//!     |     `- Collaborators ---> HttpBackend | MemoryBackend
//!     `- tables / orders / cash boxes actors (in-memory backend only)
//! ```
//!
//! ## Startup
//!
//! [`OrderDesk::start`] picks the backend from [`Config`](crate::config::Config). For the
//! in-memory backend the three resource actors are spawned first, with the order actor
//! receiving the table and cash-box clients as its context. The workflow actor is
//! spawned last and loads the table grid before serving requests.
//!
//! ## Shutdown
//!
//! Shutdown follows the channels:
//!
//! 1. **Drop handles** - the desk drops its [`WorkflowHandle`](crate::workflow::WorkflowHandle)
//!    and backend handle
//! 2. **Workflow exits** - its receiver returns `None` once no handle is left, which
//!    drops the controller and the backend clients it held
//! 3. **Resource actors exit** - their channels close in turn
//! 4. **Await completion** - [`OrderDesk::shutdown`] joins every task
//!
//! The dependency graph is acyclic (workflow -> orders -> tables, cash boxes), so no
//! explicit shutdown message is needed.
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the `tracing-subscriber` fmt layer with `RUST_LOG`
//! filtering:
//!
//! ```bash
//! RUST_LOG=info cargo run      # Compact logs
//! RUST_LOG=debug cargo run     # Payloads and polls
//! ```

pub mod desk;
pub mod tracing;

pub use desk::*;
pub use tracing::*;
