use std::num::NonZeroUsize;

use lru::LruCache;
use uuid::Uuid;

use super::LoadedMedia;

const DEFAULT_MEDIA_CACHE_SIZE: usize = 32;

/// Recently loaded media, keyed by the source media id.
pub struct MediaCache {
    loaded: LruCache<Uuid, LoadedMedia>,
}

impl MediaCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| {
                log::warn!(
                    "Media cache capacity must be > 0, using {}",
                    DEFAULT_MEDIA_CACHE_SIZE
                );
                NonZeroUsize::new(DEFAULT_MEDIA_CACHE_SIZE)
            })
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            loaded: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, source: &Uuid) -> Option<LoadedMedia> {
        self.loaded.get(source).cloned()
    }

    pub fn put(&mut self, source: Uuid, media: LoadedMedia) {
        self.loaded.put(source, media);
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
    }
}

impl Default for MediaCache {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::media::{MediaContentType, MediaRef};

    fn loaded(source: Uuid) -> LoadedMedia {
        LoadedMedia {
            media: MediaRef::imported(source, MediaContentType::Image),
            data: Arc::from(vec![1u8, 2, 3]),
        }
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = MediaCache::new(2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        cache.put(a, loaded(a));
        cache.put(b, loaded(b));
        assert!(cache.get(&a).is_some());
        cache.put(c, loaded(c));
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&a).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_falls_back() {
        let mut cache = MediaCache::new(0);
        let a = Uuid::new_v4();
        cache.put(a, loaded(a));
        assert_eq!(cache.len(), 1);
    }
}
