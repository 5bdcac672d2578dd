//! # Wireup
//!
//! Keyed dependency resolution for component trees: a read-only [`Registry`]
//! maps string keys to values (or lazily-loaded values), and each consumer
//! owns a [`Scope`] that resolves, lazily loads, and invokes them.
//!
//! ## Example
//! ```
//! use wireup::{RegistryBuilder, Scope};
//!
//! let mut builder = RegistryBuilder::new();
//! builder.register("greeting", "hello".to_string());
//!
//! let scope = Scope::new(builder.build());
//! let greeting: Option<String> = scope.use_dependency("greeting").unwrap();
//!
//! assert_eq!(greeting.as_deref(), Some("hello"));
//! ```
//!
//! Deferred registrations resolve on a [Tokio](https://tokio.rs/) runtime:
//! the first access to a deferred key spawns the load, the scope reports the
//! configured placeholder (or no value) until it settles, and dropping the
//! scope cancels anything still in flight.

pub use crate::{
    component::{Component, Render},
    hook::{Hook, HookFn},
    registry::{
        Registry, RegistryBuilder,
        lazy::{LoadOutput, Module},
    },
    scope::Scope,
};

pub mod component;
pub mod error;
pub mod hook;
pub mod registry;
pub mod scope;
