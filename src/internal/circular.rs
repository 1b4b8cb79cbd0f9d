//! Construction stack used for cycle diagnostics and runaway-depth detection.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 128;

// Thread-local construction state; resolution never crosses threads mid-chain
thread_local! {
    static CONSTRUCTION_STACK: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Marks one factory construction as in progress on the current thread.
pub(crate) struct ConstructionGuard {
    name: &'static str,
}

impl ConstructionGuard {
    pub(crate) fn enter(name: &'static str) -> DiResult<Self> {
        CONSTRUCTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(MAX_DEPTH));
            }
            stack.push(name);
            Ok(Self { name })
        })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTION_STACK.with(|stack| {
            let last = stack.borrow_mut().pop();
            debug_assert_eq!(last, Some(self.name));
        });
    }
}

/// Builds the cycle error for `name`, carrying the construction path that led back to it.
pub(crate) fn cyclic_error(name: &'static str) -> DiError {
    let mut path = CONSTRUCTION_STACK.with(|stack| stack.borrow().clone());
    path.push(name);
    DiError::Cyclic {
        type_name: name,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_pops_on_drop() {
        {
            let _outer = ConstructionGuard::enter("Outer").unwrap();
            let _inner = ConstructionGuard::enter("Inner").unwrap();
            match cyclic_error("Outer") {
                DiError::Cyclic { type_name, path } => {
                    assert_eq!(type_name, "Outer");
                    assert_eq!(path, vec!["Outer", "Inner", "Outer"]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        CONSTRUCTION_STACK.with(|stack| assert!(stack.borrow().is_empty()));
    }

    #[test]
    fn depth_is_bounded() {
        let mut guards = Vec::new();
        for _ in 0..MAX_DEPTH {
            guards.push(ConstructionGuard::enter("Deep").unwrap());
        }
        assert!(matches!(
            ConstructionGuard::enter("Deep"),
            Err(DiError::DepthExceeded(MAX_DEPTH))
        ));
        drop(guards);
    }
}
