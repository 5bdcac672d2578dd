//! Lazy registration descriptors

use super::ArcValue;
use crate::error::LoadError;
use futures_util::future::BoxFuture;
use std::fmt::Debug;

/// A type-erased loader held by a lazy descriptor
pub(crate) type LoadFn = Box<
    dyn Fn() -> Loaded
    + Send
    + Sync
>;

/// What a descriptor's loader produced: a value right away,
/// or a future that settles into one.
pub(crate) enum Loaded {
    Ready(ArcValue),
    Deferred(BoxFuture<'static, Result<ArcValue, LoadError>>),
}

/// A lazy registration: a loader invoked once per observed identity,
/// plus an optional placeholder observed while a deferred load is in flight.
pub(crate) struct Descriptor {
    pub(crate) load: LoadFn,
    pub(crate) default: Option<ArcValue>,
}

impl Debug for Descriptor {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Descriptor(..)")
    }
}

/// The shape of a settled deferred load.
///
/// Loaders either settle into the value itself or into a [`Module`]
/// wrapper carrying the value on its `default` field; the wrapper is
/// unwrapped before the value is handed to accessors.
#[derive(Debug)]
pub enum LoadOutput<T> {
    Value(T),
    Module(Module<T>),
}

/// Module-style wrapper whose payload sits on the `default` field,
/// the way a code-split bundle exposes its default export.
#[derive(Debug)]
pub struct Module<T> {
    pub default: T,
}

impl<T> LoadOutput<T> {
    #[inline]
    pub(crate) fn into_value(self) -> T {
        match self {
            LoadOutput::Value(value) => value,
            LoadOutput::Module(module) => module.default,
        }
    }
}

impl<T> From<T> for LoadOutput<T> {
    #[inline]
    fn from(value: T) -> Self {
        LoadOutput::Value(value)
    }
}

impl<T> From<Module<T>> for LoadOutput<T> {
    #[inline]
    fn from(module: Module<T>) -> Self {
        LoadOutput::Module(module)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutput, Module};

    #[test]
    fn it_unwraps_plain_values() {
        let output = LoadOutput::from(42_i32);

        assert_eq!(output.into_value(), 42);
    }

    #[test]
    fn it_unwraps_module_wrappers() {
        let output: LoadOutput<i32> = Module { default: 42 }.into();

        assert_eq!(output.into_value(), 42);
    }
}
