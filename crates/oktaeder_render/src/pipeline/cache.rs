//! Permutation Cache
//!
//! Memoizes one value per [`ShaderFlags`] key. Entries are never evicted:
//! there are at most sixteen of them and they live as long as the renderer.
//! Values are handed out as `Arc`s so callers can check identity.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use oktaeder_core::Result;

use super::flags::ShaderFlags;

pub struct PermutationCache<P> {
    entries: FxHashMap<u32, Arc<P>>,
}

impl<P> Default for PermutationCache<P> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<P> PermutationCache<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry for `flags`, building it on a miss.
    ///
    /// A failed build inserts nothing, so the next call retries.
    pub fn get_or_create(
        &mut self,
        flags: ShaderFlags,
        create: impl FnOnce(ShaderFlags) -> Result<P>,
    ) -> Result<Arc<P>> {
        let key = flags.key();
        if let Some(entry) = self.entries.get(&key) {
            return Ok(Arc::clone(entry));
        }
        let entry = Arc::new(create(flags)?);
        self.entries.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, flags: ShaderFlags) -> Option<&Arc<P>> {
        self.entries.get(&flags.key())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, flags: ShaderFlags) -> bool {
        self.entries.contains_key(&flags.key())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
