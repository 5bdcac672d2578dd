//! Renderable component values

use std::{fmt::Debug, sync::Arc};

/// A renderable piece of UI.
///
/// The crate does not ship a UI framework; this is the minimal surface a
/// registered component has to offer so that
/// [`Scope::use_component`](crate::Scope::use_component) can always hand
/// back something invocable.
pub trait Render: Send + Sync {
    /// Produces the rendered output of this component
    fn render(&self) -> String;
}

/// Any string-producing closure can act as a component
impl<F> Render for F
where
    F: Fn() -> String + Send + Sync,
{
    #[inline]
    fn render(&self) -> String {
        self()
    }
}

/// A cloneable handle to a registered component.
///
/// This is the value type stored in the registry for component
/// registrations; accessors clone the handle, not the component.
#[derive(Clone)]
pub struct Component {
    inner: Arc<dyn Render>,
}

impl Component {
    /// Wraps a renderable into a shareable handle
    #[inline]
    pub fn new(component: impl Render + 'static) -> Self {
        Self { inner: Arc::new(component) }
    }

    /// A component that renders nothing, handed out while
    /// a deferred component load is still in flight
    #[inline]
    pub fn placeholder() -> Self {
        Self::new(Placeholder)
    }
}

impl Render for Component {
    #[inline]
    fn render(&self) -> String {
        self.inner.render()
    }
}

impl Debug for Component {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Component(..)")
    }
}

struct Placeholder;

impl Render for Placeholder {
    #[inline]
    fn render(&self) -> String {
        String::new()
    }
}
