//! Flag catalog: the pool of playable countries for a session.
//!
//! DESIGN
//! ======
//! Entries live in exactly one of three vectors at any time:
//! - `available`: not yet drawn this session
//! - `used`: drawn as a round target, not answered correctly
//! - `correct`: drawn and answered correctly
//!
//! Draws move entries out of `available`; `recycle_all` folds the other two
//! back in. Nothing is ever added after `populate`, so the union of the three
//! is always the fetched set.

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use crate::provider::ProviderRecord;

const WIKIPEDIA_BASE: &str = "https://en.wikipedia.org/wiki/";
const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

// =============================================================================
// FLAG ENTRY
// =============================================================================

/// One playable country: display name plus flag image URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FlagEntry {
    country_name: String,
    image_reference: String,
}

impl FlagEntry {
    #[must_use]
    pub fn new(country_name: impl Into<String>, image_reference: impl Into<String>) -> Self {
        Self { country_name: country_name.into(), image_reference: image_reference.into() }
    }

    #[must_use]
    pub fn country_name(&self) -> &str {
        &self.country_name
    }

    #[must_use]
    pub fn image_reference(&self) -> &str {
        &self.image_reference
    }

    /// English Wikipedia article for the country.
    #[must_use]
    pub fn wikipedia_url(&self) -> String {
        format!("{WIKIPEDIA_BASE}{}", self.country_name.replace(' ', "_"))
    }

    /// Google Maps search for the country.
    #[must_use]
    pub fn maps_url(&self) -> String {
        reqwest::Url::parse_with_params(MAPS_SEARCH_URL, &[("api", "1"), ("query", self.country_name.as_str())])
            .map_or_else(|_| MAPS_SEARCH_URL.to_string(), String::from)
    }
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct FlagCatalog {
    available: Vec<FlagEntry>,
    used: Vec<FlagEntry>,
    correct: Vec<FlagEntry>,
}

impl FlagCatalog {
    /// Build a catalog from provider records. Records missing a name or an
    /// image are dropped, as are repeats of a name already seen.
    #[must_use]
    pub fn populate<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ProviderRecord>,
    {
        Self::from_entries(records.into_iter().filter_map(|record| {
            let name = record.display_name()?;
            let image = record.image_reference()?;
            Some(FlagEntry::new(name, image))
        }))
    }

    /// Build a catalog from ready-made entries, dropping duplicate names.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = FlagEntry>,
    {
        let mut seen = HashSet::new();
        let available = entries
            .into_iter()
            .filter(|e| seen.insert(e.country_name.clone()))
            .collect();
        Self { available, used: Vec::new(), correct: Vec::new() }
    }

    /// Remove one uniformly random entry from `available` and record it as
    /// used. `None` means the catalog is exhausted.
    pub fn draw_target<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<FlagEntry> {
        if self.available.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.available.len());
        let entry = self.available.swap_remove(idx);
        self.used.push(entry.clone());
        Some(entry)
    }

    /// Up to `n` distinct random entries from `available`, sampled without
    /// replacement from a scratch copy. `available` itself is untouched.
    pub fn sample_distractors<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<FlagEntry> {
        let mut pool: Vec<&FlagEntry> = self.available.iter().collect();
        let mut selected = Vec::with_capacity(n.min(pool.len()));
        while selected.len() < n && !pool.is_empty() {
            let idx = rng.random_range(0..pool.len());
            selected.push(pool.swap_remove(idx).clone());
        }
        selected
    }

    /// Move a drawn entry from `used` to `correct`. Returns false if no used
    /// entry has that name.
    pub fn mark_correct(&mut self, country_name: &str) -> bool {
        let Some(pos) = self.used.iter().position(|e| e.country_name == country_name) else {
            return false;
        };
        let entry = self.used.remove(pos);
        self.correct.push(entry);
        true
    }

    /// Return every drawn entry to `available`.
    pub fn recycle_all(&mut self) {
        self.available.append(&mut self.used);
        self.available.append(&mut self.correct);
    }

    #[must_use]
    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    #[must_use]
    pub fn used(&self) -> &[FlagEntry] {
        &self.used
    }

    /// Correctly answered entries, in the order they were answered.
    #[must_use]
    pub fn correct(&self) -> &[FlagEntry] {
        &self.correct
    }

    /// Total entries across all three sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.available.len() + self.used.len() + self.correct.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
