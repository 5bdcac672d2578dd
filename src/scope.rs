//! Per-consumer resolution scope

use crate::{
    component::Component,
    error::{Error, LoadError},
    hook::Hook,
    registry::{
        ArcValue, Entry, Registry,
        lazy::{Descriptor, Loaded},
    },
};
use futures_util::future::BoxFuture;
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Represents the resolution scope of a single consumer.
///
/// A scope is created with the registry it resolves against and owns the
/// per-key resolution state for every lazy entry it has observed. Deferred
/// loads run as spawned tasks tied to the scope's lifetime: dropping the
/// scope cancels anything still in flight, so a consumer that is torn down
/// never sees a late update.
///
/// Accessing a deferred entry spawns onto the ambient Tokio runtime, so
/// scopes with deferred registrations must be used inside one.
pub struct Scope {
    registry: Registry,
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    slots: Mutex<HashMap<String, Slot>>,
    version: watch::Sender<u64>,
    cancellation_token: CancellationToken,
}

/// Resolution state for one key, valid for one descriptor identity
struct Slot {
    descriptor: Arc<Descriptor>,
    state: SlotState,
}

enum SlotState {
    /// A deferred load is in flight; accessors observe the default, if any
    Pending,
    /// The loader settled into a value
    Resolved(ArcValue),
    /// The loader settled into an error; accessors keep observing the default
    Failed,
}

impl Debug for Scope {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scope(..)")
    }
}

impl Scope {
    /// Creates a scope resolving against `registry`
    pub fn new(registry: Registry) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            registry,
            inner: Arc::new(ScopeInner {
                slots: Mutex::new(HashMap::new()),
                version,
                cancellation_token: CancellationToken::new(),
            }),
        }
    }

    /// Swaps the registry this scope resolves against.
    ///
    /// Models the provider supplying a new mapping: a key whose descriptor
    /// identity changed restarts its resolution cycle on the next access,
    /// including a fresh `load` call.
    pub fn update_registry(&mut self, registry: Registry) {
        self.registry = registry;
    }

    /// Resolves `key` to a cloned value.
    ///
    /// Returns `Ok(None)` while a deferred load with no configured default
    /// is still in flight. `T` must implement [`Clone`], otherwise use
    /// [`use_dependency_shared`](Self::use_dependency_shared) that returns
    /// a shared pointer.
    pub fn use_dependency<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_dependency_shared::<T>(key)
            .map(|value| value.map(|v| v.as_ref().clone()))
    }

    /// Resolves `key` to a shared pointer
    pub fn use_dependency_shared<T>(&self, key: &str) -> Result<Option<Arc<T>>, Error>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_entry::<T>("use_dependency", key)
    }

    /// Resolves `key` to a renderable [`Component`].
    ///
    /// Never yields "no value": while a deferred component load with no
    /// default is in flight, returns [`Component::placeholder`] so the
    /// caller can render unconditionally.
    pub fn use_component(&self, key: &str) -> Result<Component, Error> {
        let component = self
            .resolve_entry::<Component>("use_component", key)?
            .map_or_else(Component::placeholder, |c| c.as_ref().clone());
        Ok(component)
    }

    /// Resolves `key` to a [`Hook`] and invokes it with `args`.
    ///
    /// Fails with [`Error::MissingDefaultValue`] when the hook has not
    /// resolved yet and no default was configured; anything the hook itself
    /// returns or panics with passes through unchanged.
    pub fn use_hook<Args, R>(&self, key: &str, args: Args) -> Result<R, Error>
    where
        Args: Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        match self.resolve_entry::<Hook<Args, R>>("use_hook", key)? {
            Some(hook) => Ok(hook.call(args)),
            None => Err(Error::missing_default(key)),
        }
    }

    /// Subscribes to settlement notifications.
    ///
    /// The watched counter bumps once per applied settlement, in settlement
    /// order, no earlier than the next executor poll after a load settles.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    /// Waits until `key` is no longer pending.
    ///
    /// Returns immediately for keys that are unset, direct, already settled,
    /// or not yet observed by this scope.
    pub async fn settled(&self, key: &str) {
        let mut updates = self.updates();
        loop {
            if !self.is_pending(key) {
                return;
            }
            if updates.changed().await.is_err() {
                return;
            }
        }
    }

    fn is_pending(&self, key: &str) -> bool {
        let slots = self.inner.slots.lock().unwrap();
        matches!(
            slots.get(key).map(|slot| &slot.state),
            Some(SlotState::Pending)
        )
    }

    fn resolve_entry<T>(&self, accessor: &'static str, key: &str) -> Result<Option<Arc<T>>, Error>
    where
        T: Send + Sync + 'static,
    {
        match self.registry.entry(key) {
            None => Err(Error::unset(accessor, key)),
            Some(Entry::Direct(value)) => downcast::<T>(key, value).map(Some),
            Some(Entry::Lazy(descriptor)) => self.resolve_lazy::<T>(key, descriptor),
        }
    }

    fn resolve_lazy<T>(&self, key: &str, descriptor: &Arc<Descriptor>) -> Result<Option<Arc<T>>, Error>
    where
        T: Send + Sync + 'static,
    {
        let mut slots = self.inner.slots.lock().unwrap();

        let fresh = match slots.get(key) {
            Some(slot) => !Arc::ptr_eq(&slot.descriptor, descriptor),
            None => true,
        };
        if fresh {
            let slot = self.observe(key, descriptor);
            slots.insert(key.to_owned(), slot);
        }

        let slot = &slots[key];
        match &slot.state {
            SlotState::Resolved(value) => downcast::<T>(key, value).map(Some),
            SlotState::Pending | SlotState::Failed => match &slot.descriptor.default {
                Some(value) => downcast::<T>(key, value).map(Some),
                None => Ok(None),
            },
        }
    }

    /// First observation of a descriptor identity: run the loader exactly once
    fn observe(&self, key: &str, descriptor: &Arc<Descriptor>) -> Slot {
        match (descriptor.load)() {
            Loaded::Ready(value) => Slot {
                descriptor: descriptor.clone(),
                state: SlotState::Resolved(value),
            },
            Loaded::Deferred(fut) => {
                self.spawn_load(key.to_owned(), descriptor.clone(), fut);
                Slot {
                    descriptor: descriptor.clone(),
                    state: SlotState::Pending,
                }
            }
        }
    }

    fn spawn_load(
        &self,
        key: String,
        descriptor: Arc<Descriptor>,
        fut: BoxFuture<'static, Result<ArcValue, LoadError>>,
    ) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let settled = tokio::select! {
                () = inner.cancellation_token.cancelled() => return,
                settled = fut => settled,
            };

            {
                let mut slots = inner.slots.lock().unwrap();
                let Some(slot) = slots.get_mut(&key) else { return };
                if !Arc::ptr_eq(&slot.descriptor, &descriptor) {
                    // superseded by a new descriptor while in flight
                    return;
                }
                slot.state = match settled {
                    Ok(value) => SlotState::Resolved(value),
                    Err(err) => {
                        tracing::error!("deferred load for \"{key}\" failed: {err:#}");
                        SlotState::Failed
                    }
                };
            }

            inner.version.send_modify(|v| *v += 1);
        });
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.inner.cancellation_token.cancel();
    }
}

fn downcast<T>(key: &str, value: &ArcValue) -> Result<Arc<T>, Error>
where
    T: Send + Sync + 'static,
{
    value
        .clone()
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch(key, std::any::type_name::<T>()))
}
