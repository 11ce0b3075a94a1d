//! Favorites and matchmaking
//!
//! Favorites are a user-curated, insertion-ordered set of dogs that
//! lives for the process, independent of any search. The matchmaker
//! posts the favorited ids and resolves the chosen id against the
//! in-memory favorites, never against a fresh fetch.

use std::sync::{Arc, Mutex};

use crate::api::{CatalogApi, Dog};
use crate::error::ApiError;

/// Insertion-ordered set of favorited dogs, keyed by id
pub struct FavoritesStore {
    inner: Mutex<Vec<Dog>>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    /// Toggle membership by id: add if absent, remove if present.
    /// Returns true when the dog was added.
    pub fn toggle(&self, dog: &Dog) -> bool {
        let mut favorites = self.inner.lock().unwrap();
        if let Some(pos) = favorites.iter().position(|fav| fav.id == dog.id) {
            favorites.remove(pos);
            log::debug!("unfavorited {} ({})", dog.name, dog.id);
            false
        } else {
            favorites.push(dog.clone());
            log::debug!("favorited {} ({})", dog.name, dog.id);
            true
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner.lock().unwrap().iter().any(|fav| fav.id == id)
    }

    /// Cloned snapshot in insertion order
    pub fn favorites(&self) -> Vec<Dog> {
        self.inner.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().iter().map(|fav| fav.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

impl Default for FavoritesStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a match from the current favorites via the remote call
pub struct Matchmaker {
    api: Arc<dyn CatalogApi>,
    favorites: Arc<FavoritesStore>,
    current: Mutex<Option<Dog>>,
}

impl Matchmaker {
    pub fn new(api: Arc<dyn CatalogApi>, favorites: Arc<FavoritesStore>) -> Self {
        Self {
            api,
            favorites,
            current: Mutex::new(None),
        }
    }

    pub fn current_match(&self) -> Option<Dog> {
        self.current.lock().unwrap().clone()
    }

    /// Post the favorited ids and resolve the returned id against the
    /// favorites snapshot taken when the call was issued. A returned id
    /// no longer in that snapshot (the user unfavorited it mid-flight)
    /// resolves to `None`, not an error. On a failed call the favorites
    /// and the previous match stay untouched.
    pub async fn generate(&self) -> Result<Option<Dog>, ApiError> {
        let snapshot = self.favorites.favorites();
        if snapshot.is_empty() {
            return Err(ApiError::InvalidRequest(
                "cannot generate a match with no favorites".to_string(),
            ));
        }

        let ids: Vec<String> = snapshot.iter().map(|fav| fav.id.clone()).collect();
        let response = self.api.match_dogs(&ids).await?;

        let matched = snapshot.into_iter().find(|fav| fav.id == response.match_id);
        match &matched {
            Some(dog) => log::info!("matched with {} ({})", dog.name, dog.id),
            None => log::warn!(
                "matched id {} is no longer favorited, resolving to none",
                response.match_id
            ),
        }

        *self.current.lock().unwrap() = matched.clone();
        Ok(matched)
    }
}
