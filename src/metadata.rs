//! Dependency metadata sources and the dependency lists built from them.

use std::collections::BTreeMap;

use crate::class::Class;
use crate::key::Key;
use crate::traits::Injectable;

/// Ordered, possibly sparse list of dependency keys plus named side keys.
///
/// Holes (`None`) are first-class: a hole that survives dependency discovery makes
/// construction fail naming its index. Side keys carry data that is not positional,
/// such as property-injection hints.
///
/// # Examples
///
/// ```
/// use arbor_di::{DependencyList, Key};
///
/// let list = DependencyList::new()
///     .with_hole()
///     .with_key(Key::name("logger"))
///     .with_extra("audit", Key::name("audit-log"));
///
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(0), None);
/// assert_eq!(list.get(1), Some(&Key::name("logger")));
/// assert_eq!(list.extra("audit"), Some(&Key::name("audit-log")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    keys: Vec<Option<Key>>,
    extras: BTreeMap<String, Key>,
}

impl DependencyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self {
            keys: keys.into_iter().map(|key| Some(key.into())).collect(),
            extras: BTreeMap::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.keys.push(Some(key.into()));
        self
    }

    pub fn with_hole(mut self) -> Self {
        self.keys.push(None);
        self
    }

    /// Sets the key at `index`, padding with holes as needed.
    pub fn with_param(mut self, index: usize, key: impl Into<Key>) -> Self {
        self.set(index, key.into());
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, key: impl Into<Key>) -> Self {
        self.extras.insert(name.into(), key.into());
        self
    }

    pub fn set(&mut self, index: usize, key: Key) {
        if self.keys.len() <= index {
            self.keys.resize(index + 1, None);
        }
        self.keys[index] = Some(key);
    }

    pub fn keys(&self) -> &[Option<Key>] {
        &self.keys
    }

    pub fn get(&self, index: usize) -> Option<&Key> {
        self.keys.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn extras(&self) -> &BTreeMap<String, Key> {
        &self.extras
    }

    pub fn extra(&self, name: &str) -> Option<&Key> {
        self.extras.get(name)
    }

    /// Every defined position of `other` wins over `self`; side keys are copied across.
    pub(crate) fn overlay(&mut self, other: &DependencyList) {
        for (index, key) in other.keys.iter().enumerate() {
            if let Some(key) = key {
                self.set(index, key.clone());
            }
        }
        for (name, key) in &other.extras {
            self.extras.insert(name.clone(), key.clone());
        }
    }
}

/// Where a type's dependency list comes from.
///
/// - `inject`: explicit list, used verbatim when present
/// - `design`: constructor parameter types
/// - `annotation`: explicitly declared keys per parameter index, plus side keys
/// - `base`: parent type whose discovered list is inherited when nothing else is declared
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    inject: Option<DependencyList>,
    design: Option<DependencyList>,
    annotation: Option<DependencyList>,
    base: Option<Class>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.inject = Some(DependencyList::from_keys(keys));
        self
    }

    pub fn inject_list(mut self, list: DependencyList) -> Self {
        self.inject = Some(list);
        self
    }

    pub fn design(mut self, list: DependencyList) -> Self {
        self.design = Some(list);
        self
    }

    pub fn design_keys<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.design(DependencyList::from_keys(keys))
    }

    pub fn annotation(mut self, list: DependencyList) -> Self {
        self.annotation = Some(list);
        self
    }

    /// Declares the key for parameter `index`.
    pub fn annotate(mut self, index: usize, key: impl Into<Key>) -> Self {
        self.annotation
            .get_or_insert_with(DependencyList::new)
            .set(index, key.into());
        self
    }

    /// Declares a non-positional side key.
    pub fn annotate_extra(mut self, name: impl Into<String>, key: impl Into<Key>) -> Self {
        self.annotation
            .get_or_insert_with(DependencyList::new)
            .extras
            .insert(name.into(), key.into());
        self
    }

    pub fn extends<T: Injectable>(self) -> Self {
        self.extends_class(Class::of::<T>())
    }

    pub fn extends_class(mut self, base: Class) -> Self {
        self.base = Some(base);
        self
    }

    pub fn inject_source(&self) -> Option<&DependencyList> {
        self.inject.as_ref()
    }

    pub fn design_source(&self) -> Option<&DependencyList> {
        self.design.as_ref()
    }

    pub fn annotation_source(&self) -> Option<&DependencyList> {
        self.annotation.as_ref()
    }

    pub fn base(&self) -> Option<Class> {
        self.base
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Option<DependencyList>,
        Option<DependencyList>,
        Option<DependencyList>,
        Option<Class>,
    ) {
        (self.inject, self.design, self.annotation, self.base)
    }
}
