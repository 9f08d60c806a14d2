//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

mod pages;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::RepoError;
use quill_core::domain::{DEFAULT_SITE_TITLE, Image, Role, User};
use quill_core::ports::{BaseRepository, ImageRepository, SiteRepository, UserRepository};

pub use pages::InMemoryPageRepository;

/// Users keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<BTreeMap<i64, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            store: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    /// Add a user, assigning the next free id. Usernames are unique.
    pub async fn insert(
        &self,
        username: &str,
        name: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store.values().any(|u| u.username == username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already taken",
                username
            )));
        }

        let id = store.keys().next_back().map_or(1, |last| last + 1);
        let user = User {
            id,
            username: username.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        store.insert(id, user.clone());

        Ok(user)
    }

    pub(crate) async fn usernames(&self) -> BTreeMap<i64, String> {
        let store = self.store.read().await;
        store
            .iter()
            .map(|(id, user)| (*id, user.username.clone()))
            .collect()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.store.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

/// Fixed image catalogue.
#[derive(Default)]
pub struct InMemoryImageRepository {
    images: BTreeMap<i64, Image>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(images: impl IntoIterator<Item = Image>) -> Self {
        Self {
            images: images.into_iter().map(|i| (i.id, i)).collect(),
        }
    }
}

#[async_trait]
impl BaseRepository<Image, i64> for InMemoryImageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Image>, RepoError> {
        Ok(self.images.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Image>, RepoError> {
        Ok(self.images.values().cloned().collect())
    }
}

impl ImageRepository for InMemoryImageRepository {}

/// Site settings held in process memory.
pub struct InMemorySiteRepository {
    title: RwLock<String>,
}

impl InMemorySiteRepository {
    pub fn new() -> Self {
        Self {
            title: RwLock::new(DEFAULT_SITE_TITLE.to_string()),
        }
    }
}

impl Default for InMemorySiteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn title(&self) -> Result<String, RepoError> {
        Ok(self.title.read().await.clone())
    }

    async fn set_title(&self, title: &str) -> Result<String, RepoError> {
        let mut current = self.title.write().await;
        *current = title.to_string();
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.insert("ada", "Ada", "hash", Role::Admin).await.unwrap();
        let second = repo.insert("alan", "Alan", "hash", Role::Author).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert("ada", "Ada", "hash", Role::Admin).await.unwrap();

        let result = repo.insert("ada", "Other Ada", "hash", Role::Author).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let repo = InMemoryUserRepository::new();
        repo.insert("ada", "Ada", "hash", Role::Admin).await.unwrap();

        let found = repo.find_by_username("ada").await.unwrap().unwrap();
        assert_eq!(found.name, "Ada");
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_image_catalogue() {
        let repo = InMemoryImageRepository::with_images(vec![Image {
            id: 3,
            name: "Harbour".to_string(),
            path: "/images/harbour.jpg".to_string(),
        }]);

        assert_eq!(repo.find_all().await.unwrap().len(), 1);
        assert!(repo.find_by_id(3).await.unwrap().is_some());
        assert!(repo.find_by_id(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_site_title_starts_at_default() {
        let repo = InMemorySiteRepository::new();
        assert_eq!(repo.title().await.unwrap(), DEFAULT_SITE_TITLE);

        repo.set_title("Harbour Notes").await.unwrap();
        assert_eq!(repo.title().await.unwrap(), "Harbour Notes");
    }
}
