//! Page-lifetime translation cache
//!
//! Keyed by target language and trimmed text. Entries are never evicted; the
//! cache lives as long as the page view. A key is `Pending` from the moment
//! its request is issued, so later hovers over the same text join it instead
//! of issuing another.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::translate::payload::TranslationResponse;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKey {
    pub target_lang: String,
    pub text: String,
}

impl CacheKey {
    pub fn new(target_lang: &str, text: &str) -> Self {
        Self {
            target_lang: target_lang.to_string(),
            text: text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Pending,
    Resolved(TranslationResponse),
}

#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<CacheKey, CacheEntry>,
    requests_issued: u64,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Claim `key`. Returns true iff the caller must issue the request.
    pub fn begin(&mut self, key: &CacheKey) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.clone(), CacheEntry::Pending);
        self.requests_issued += 1;
        true
    }

    pub fn resolve(&mut self, key: CacheKey, response: TranslationResponse) {
        self.entries.insert(key, CacheEntry::Resolved(response));
    }

    /// Drop a failed request so the next hover retries it
    pub fn forget(&mut self, key: &CacheKey) {
        if let Some(CacheEntry::Pending) = self.entries.get(key) {
            self.entries.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requests handed out since creation
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_trims_text() {
        assert_eq!(CacheKey::new("en", "  日本 \n"), CacheKey::new("en", "日本"));
        assert_ne!(CacheKey::new("en", "日本"), CacheKey::new("fr", "日本"));
    }

    #[test]
    fn test_begin_once_per_key() {
        let mut cache = TranslationCache::new();
        let key = CacheKey::new("en", "日本");
        assert!(cache.begin(&key));
        assert!(!cache.begin(&key));
        assert_eq!(cache.get(&key), Some(&CacheEntry::Pending));
        assert_eq!(cache.requests_issued(), 1);
    }

    #[test]
    fn test_forget_only_pending() {
        let mut cache = TranslationCache::new();
        let key = CacheKey::new("en", "日本");
        cache.begin(&key);
        cache.forget(&key);
        assert!(cache.is_empty());

        cache.begin(&key);
        cache.resolve(key.clone(), TranslationResponse::default());
        cache.forget(&key);
        assert_eq!(cache.len(), 1);
    }
}
