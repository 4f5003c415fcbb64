//! Registry of token kinds.
//!
//! The registry maps kind ids to [`TokenKind`]s and fixes the order in which
//! the parser tries them:
//!
//! 1. specific kinds, built-ins first, then custom kinds in registration order
//! 2. fallback kinds (`tag`, then `word`)
//!
//! Registering a kind whose id already exists replaces it in place. This is how
//! a built-in is overridden, and it is never an error.
//!
//! A process-wide default registry backs [`crate::Task::parse`]. It starts with
//! the built-ins and is changed through [`TokenRegistry::register_global`] and
//! friends; [`TokenRegistry::global`] hands out a snapshot.

use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

use super::{builtin, TokenKind};

static GLOBAL: Lazy<RwLock<TokenRegistry>> =
    Lazy::new(|| RwLock::new(TokenRegistry::with_builtins()));

#[derive(Clone)]
pub struct TokenRegistry {
    kinds: Vec<Arc<dyn TokenKind>>,
}

impl TokenRegistry {
    /// A registry without any kinds. Lines parse into plain words.
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    pub fn with_builtins() -> Self {
        Self {
            kinds: builtin::all(),
        }
    }

    /// Adds a kind, replacing (in place) any kind with the same id.
    ///
    /// Returns the replaced kind.
    pub fn register<K: TokenKind + 'static>(&mut self, kind: K) -> Option<Arc<dyn TokenKind>> {
        self.register_arc(Arc::new(kind))
    }

    pub fn register_arc(&mut self, kind: Arc<dyn TokenKind>) -> Option<Arc<dyn TokenKind>> {
        match self.kinds.iter().position(|k| k.id() == kind.id()) {
            Some(index) => {
                tracing::debug!(kind = kind.id(), "overriding token kind");
                Some(std::mem::replace(&mut self.kinds[index], kind))
            }
            None => {
                tracing::debug!(kind = kind.id(), "registering token kind");
                self.kinds.push(kind);
                None
            }
        }
    }

    /// Removes a kind. Unknown ids are ignored.
    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn TokenKind>> {
        let index = self.kinds.iter().position(|k| k.id() == id)?;
        tracing::debug!(kind = id, "unregistering token kind");
        Some(self.kinds.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn TokenKind>> {
        self.kinds.iter().find(|k| k.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Kinds in the order the parser tries them.
    pub fn ordered_kinds(&self) -> impl Iterator<Item = &Arc<dyn TokenKind>> {
        let specific = self.kinds.iter().filter(|k| !k.is_fallback());
        let fallback = self.kinds.iter().filter(|k| k.is_fallback());
        specific.chain(fallback)
    }

    pub fn kind_ids(&self) -> Vec<&str> {
        self.ordered_kinds().map(|k| k.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// A snapshot of the process-wide registry.
    pub fn global() -> TokenRegistry {
        GLOBAL
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn register_global<K: TokenKind + 'static>(kind: K) -> Option<Arc<dyn TokenKind>> {
        GLOBAL
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(kind)
    }

    pub fn unregister_global(id: &str) -> Option<Arc<dyn TokenKind>> {
        GLOBAL
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(id)
    }

    /// Restores the process-wide registry to the built-ins.
    pub fn reset_global() {
        *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = TokenRegistry::with_builtins();
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kind_ids()).finish()
    }
}
