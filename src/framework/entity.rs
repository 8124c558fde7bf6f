//! # ActorEntity Trait
//!
//! The contract every backend resource (table, order, cash box) implements so that a
//! generic [`ResourceActor`](crate::framework::ResourceActor) can own it.
//!
//! Associated types pin down the payloads of each operation. An order actor only
//! accepts order payloads, and a cash box actor only accepts cash box payloads; the
//! compiler rejects anything else.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`] runs after construction and may veto the creation.
//! - [`ActorEntity::matches`] defaults to "everything matches" for resources that are
//!   listed without filters.

use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// Trait that any resource entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// Hooks are async so an entity can call other actors while handling a request
/// (an order that is marked as paid records income in the cash box actor).
/// The `Context` type carries those dependencies. It is handed to
/// [`ResourceActor::run`](crate::framework::ResourceActor::run), not to the
/// constructor, so actors can be created first and wired afterwards.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Identifier. Ordered so listings come back in creation order.
    /// Built from the actor's `u32` sequence.
    type Id: Ord + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations beyond create/read/update (e.g. `MarkPaid`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Query used by `List` requests.
    type Filter: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum per resource, shared by all of its operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the allocated id and the create payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Whether this entity belongs in the result of a `List` request.
    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }

    /// Called after the entity is built but before it is stored.
    /// Returning an error discards the entity and releases nothing else.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
