//! Per-resolution bookkeeping for cycle detection.

use crate::errors::{Error, Result};
use crate::identity::TypeKey;

/// The set of identities currently under construction on one resolution
/// call stack, in entry order.
///
/// A fresh context is created for every top-level entry point and threaded
/// by `&mut` through the whole recursive descent, then dropped when the
/// call returns. Independent resolutions never share a context.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    in_progress: Vec<TypeKey>,
}

impl ResolutionContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as under construction. Fails when the key is already in
    /// progress, which means the dependency chain loops back onto itself.
    pub(crate) fn enter(&mut self, key: TypeKey) -> Result<()> {
        if self.in_progress.contains(&key) {
            let mut chain: Vec<&'static str> =
                self.in_progress.iter().map(|entry| entry.name()).collect();
            chain.push(key.name());
            return Err(Error::CircularDependency { chain });
        }
        self.in_progress.push(key);
        Ok(())
    }

    pub(crate) fn exit(&mut self, key: TypeKey) {
        if let Some(position) = self.in_progress.iter().rposition(|entry| *entry == key) {
            self.in_progress.remove(position);
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.in_progress.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn enter_exit_roundtrip() {
        let mut ctx = ResolutionContext::new();
        ctx.enter(TypeKey::of::<A>()).unwrap();
        ctx.enter(TypeKey::of::<B>()).unwrap();
        assert_eq!(ctx.depth(), 2);
        ctx.exit(TypeKey::of::<B>());
        ctx.exit(TypeKey::of::<A>());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn re_entering_reports_full_chain() {
        let mut ctx = ResolutionContext::new();
        ctx.enter(TypeKey::of::<A>()).unwrap();
        ctx.enter(TypeKey::of::<B>()).unwrap();
        let err = ctx.enter(TypeKey::of::<A>()).unwrap_err();
        match err {
            Error::CircularDependency { chain } => {
                assert_eq!(chain.len(), 3);
                assert_eq!(chain.first(), chain.last());
            }
            other => panic!("expected CircularDependency, got {other}"),
        }
    }

    #[test]
    fn fresh_context_is_empty() {
        // Each top-level resolution starts from a clean set; a key entered
        // by a previous context must not linger.
        let mut first = ResolutionContext::new();
        first.enter(TypeKey::of::<A>()).unwrap();
        drop(first);

        let mut second = ResolutionContext::new();
        assert!(second.enter(TypeKey::of::<A>()).is_ok());
    }
}
