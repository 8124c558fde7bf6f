//! Generic actor framework for resource management.
//!
//! The building blocks behind [`MemoryBackend`](crate::backend::MemoryBackend): each
//! backend resource (tables, orders, cash boxes) is an [`ActorEntity`] owned by its
//! own [`ResourceActor`] and reached through a cloneable [`ResourceClient`].
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns the entities and runs the hooks
//! - [`ResourceClient`] - Typed sender used by everything else
//! - [`FrameworkError`] - Channel and lookup failures

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
