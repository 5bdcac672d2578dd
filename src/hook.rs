//! Typed callables registered as dependencies

use std::{fmt::Debug, sync::Arc};

/// A trait that describes a callable that can be registered under a key
/// and invoked with a matching argument tuple
pub trait HookFn<Args>: Send + Sync + 'static {
    /// The callable's own return type, forwarded unchanged to the caller
    type Output;

    /// Calls the underlying function with the unpacked arguments
    fn call(&self, args: Args) -> Self::Output;
}

impl<F, R> HookFn<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
{
    type Output = R;

    #[inline]
    fn call(&self, _: ()) -> Self::Output {
        self()
    }
}

macro_rules! define_hook_fn ({ $($param:ident)* } => {
    impl<F, R, $($param,)*> HookFn<($($param,)*)> for F
    where
        F: Fn($($param),*) -> R + Send + Sync + 'static,
    {
        type Output = R;

        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Self::Output {
            (self)($($param,)*)
        }
    }
});

define_hook_fn! { T1 }
define_hook_fn! { T1 T2 }
define_hook_fn! { T1 T2 T3 }
define_hook_fn! { T1 T2 T3 T4 }
define_hook_fn! { T1 T2 T3 T4 T5 }

/// A type-erased cloneable callable, the value type stored in the registry
/// for hook registrations.
///
/// `Args` is the argument tuple and `R` the return type; both must match
/// at the [`Scope::use_hook`](crate::Scope::use_hook) call site.
pub struct Hook<Args, R> {
    f: Arc<dyn Fn(Args) -> R + Send + Sync>,
}

impl<Args, R> Clone for Hook<Args, R> {
    #[inline]
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<Args, R> Hook<Args, R> {
    /// Wraps a callable into an erased, shareable hook
    pub fn new<F>(hook: F) -> Self
    where
        F: HookFn<Args, Output = R>,
    {
        Self { f: Arc::new(move |args| hook.call(args)) }
    }

    /// Invokes the hook with the packed argument tuple
    #[inline]
    pub fn call(&self, args: Args) -> R {
        (self.f)(args)
    }
}

impl<Args, R> Debug for Hook<Args, R> {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hook(..)")
    }
}
