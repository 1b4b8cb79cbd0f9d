//! Dependency discovery: turning a type's metadata into its dependency list.

use std::sync::Arc;

use crate::catalog::TypeCatalog;
use crate::class::Class;
use crate::metadata::DependencyList;

/// Returns the discovered dependency list of `class`, cached in the shared catalog.
///
/// Discovery rules, first match wins:
///
/// 1. An explicit inject list is used verbatim.
/// 2. With neither design nor annotation metadata, the base type's list is inherited
///    (through the same cache), or the list is empty when there is no base.
/// 3. With only one of design and annotation, that one is used.
/// 4. With both, the design list is the baseline and every defined annotation position
///    overrides it. Annotation side keys are copied onto the result.
///
/// # Examples
///
/// ```
/// use arbor_di::{get_dependencies, Args, DiResult, Injectable, Key, Metadata};
///
/// struct Mailer;
///
/// impl Injectable for Mailer {
///     fn metadata() -> Metadata {
///         Metadata::new()
///             .design_keys([Key::name("transport"), Key::name("templates")])
///             .annotate(1, Key::name("html-templates"))
///     }
///
///     fn construct(_args: Args) -> DiResult<Self> {
///         Ok(Mailer)
///     }
/// }
///
/// let deps = get_dependencies(&arbor_di::Class::of::<Mailer>());
/// assert_eq!(deps.get(0), Some(&Key::name("transport")));
/// assert_eq!(deps.get(1), Some(&Key::name("html-templates")));
/// ```
pub fn get_dependencies(class: &Class) -> Arc<DependencyList> {
    TypeCatalog::shared().dependencies(class)
}

pub(crate) fn discover(class: &Class, catalog: &TypeCatalog) -> DependencyList {
    let (inject, design, annotation, base) = class.metadata().into_parts();

    if let Some(inject) = inject {
        return inject;
    }

    match (design, annotation) {
        (None, None) => match base {
            Some(base) => catalog.dependencies(&base).as_ref().clone(),
            None => DependencyList::new(),
        },
        (None, Some(annotation)) => annotation,
        (Some(design), None) => design,
        (Some(mut design), Some(annotation)) => {
            design.overlay(&annotation);
            design
        }
    }
}
