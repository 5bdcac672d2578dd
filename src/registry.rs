//! Dependency registry and builder

use crate::{
    component::{Component, Render},
    error::LoadError,
    hook::{Hook, HookFn},
    registry::lazy::{Descriptor, LoadFn, LoadOutput, Loaded},
};
use std::{
    any::Any,
    collections::HashMap,
    fmt::Debug,
    future::Future,
    sync::Arc,
};

pub mod lazy;

/// A type-erased registered value
pub(crate) type ArcValue = Arc<
    dyn Any
    + Send
    + Sync
>;

/// A single registration: either an eagerly supplied value
/// or a lazy descriptor whose identity is the [`Arc`] pointer.
pub(crate) enum Entry {
    Direct(ArcValue),
    Lazy(Arc<Descriptor>),
}

impl Debug for Entry {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Direct(_) => f.write_str("Entry::Direct(..)"),
            Entry::Lazy(_) => f.write_str("Entry::Lazy(..)"),
        }
    }
}

/// Inner HashMap of registrations
type EntryMap = HashMap<String, Entry>;

/// Represents a registry builder, that is able to add dependencies
/// under string keys as direct values, lazy loaders, or deferred loaders.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: EntryMap,
}

impl RegistryBuilder {
    /// Creates a new registry builder
    #[inline]
    pub fn new() -> Self {
        Self { entries: EntryMap::default() }
    }

    /// Freezes the registrations into a read-only [`Registry`]
    #[inline]
    pub fn build(self) -> Registry {
        Registry {
            entries: Arc::new(self.entries),
        }
    }

    /// Registers a direct value under `key`.
    ///
    /// Direct values resolve synchronously and unchanged on every access.
    pub fn register<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Entry::Direct(Arc::new(value)));
    }

    /// Registers a synchronous lazy loader under `key`.
    ///
    /// The loader runs once per scope on first access; its result is held
    /// by the scope for as long as the descriptor identity is unchanged.
    pub fn register_lazy<T, F>(&mut self, key: impl Into<String>, load: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let load: LoadFn = Box::new(move || Loaded::Ready(Arc::new(load()) as ArcValue));
        self.insert_descriptor(key, load, None);
    }

    /// Registers an asynchronous loader under `key` with no placeholder.
    ///
    /// Until the load settles, accessors observe no value for the key.
    pub fn register_deferred<T, F, Fut>(&mut self, key: impl Into<String>, load: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadOutput<T>, LoadError>> + Send + 'static,
    {
        let load = Self::erase_deferred(load);
        self.insert_descriptor(key, load, None);
    }

    /// Registers an asynchronous loader under `key` with a placeholder that
    /// accessors observe until the load settles.
    pub fn register_deferred_with_default<T, F, Fut>(
        &mut self,
        key: impl Into<String>,
        default: T,
        load: F,
    )
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadOutput<T>, LoadError>> + Send + 'static,
    {
        let load = Self::erase_deferred(load);
        self.insert_descriptor(key, load, Some(Arc::new(default) as ArcValue));
    }

    /// Registers a renderable component under `key`
    pub fn register_component<C: Render + 'static>(&mut self, key: impl Into<String>, component: C) {
        self.register(key, Component::new(component));
    }

    /// Registers a synchronous lazy component under `key`
    pub fn register_lazy_component<C, F>(&mut self, key: impl Into<String>, load: F)
    where
        C: Render + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.register_lazy(key, move || Component::new(load()));
    }

    /// Registers an asynchronous component loader under `key`.
    ///
    /// No explicit placeholder is needed: until the load settles,
    /// [`Scope::use_component`](crate::Scope::use_component) hands out
    /// [`Component::placeholder`] which renders nothing.
    pub fn register_deferred_component<C, F, Fut>(&mut self, key: impl Into<String>, load: F)
    where
        C: Render + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, LoadError>> + Send + 'static,
    {
        self.register_deferred(key, move || {
            let fut = load();
            async move { fut.await.map(|c| LoadOutput::Value(Component::new(c))) }
        });
    }

    /// Registers a callable under `key`, invocable through
    /// [`Scope::use_hook`](crate::Scope::use_hook) with a matching argument tuple.
    pub fn register_hook<F, Args>(&mut self, key: impl Into<String>, hook: F)
    where
        F: HookFn<Args>,
        Args: Send + Sync + 'static,
        F::Output: Send + Sync + 'static,
    {
        self.register(key, Hook::<Args, F::Output>::new(hook));
    }

    fn erase_deferred<T, F, Fut>(load: F) -> LoadFn
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadOutput<T>, LoadError>> + Send + 'static,
    {
        Box::new(move || {
            let fut = load();
            Loaded::Deferred(Box::pin(async move {
                fut.await.map(|output| Arc::new(output.into_value()) as ArcValue)
            }))
        })
    }

    fn insert_descriptor(&mut self, key: impl Into<String>, load: LoadFn, default: Option<ArcValue>) {
        let descriptor = Descriptor { load, default };
        self.entries.insert(key.into(), Entry::Lazy(Arc::new(descriptor)));
    }
}

/// Represents a read-only registry of dependencies, shared by value
#[derive(Debug, Clone)]
pub struct Registry {
    /// Read-only HashMap of registrations
    entries: Arc<EntryMap>,
}

impl Registry {
    /// Fetch the entry registered under `key`
    #[inline]
    pub(crate) fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is registered
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of registrations
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, RegistryBuilder};

    #[test]
    fn it_registers_direct_values() {
        let mut builder = RegistryBuilder::new();
        builder.register("answer", 42_i32);

        let registry = builder.build();

        assert!(registry.contains("answer"));
        assert!(matches!(registry.entry("answer"), Some(Entry::Direct(_))));
    }

    #[test]
    fn it_registers_lazy_entries() {
        let mut builder = RegistryBuilder::new();
        builder.register_lazy("answer", || 42_i32);

        let registry = builder.build();

        assert!(matches!(registry.entry("answer"), Some(Entry::Lazy(_))));
    }

    #[test]
    fn last_registration_wins() {
        let mut builder = RegistryBuilder::new();
        builder.register("answer", 1_i32);
        builder.register("answer", 2_i32);

        let registry = builder.build();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn it_reports_missing_keys() {
        let registry = RegistryBuilder::new().build();

        assert!(registry.is_empty());
        assert!(!registry.contains("answer"));
        assert!(registry.entry("answer").is_none());
    }
}
