use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ContentPlan, Image, NewBlock, Page, PageFields, PageSummary, User};
use crate::error::RepoError;

/// Generic read access shared by the simple repositories.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// List every entity, ordered by ID.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    /// Find a user by login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Image catalogue.
pub trait ImageRepository: BaseRepository<Image, i64> {}

/// Pages and the content blocks they own.
///
/// Writes that touch several rows (a page and its blocks) are applied as a
/// single unit: either every write lands or none does.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Every page, with the author's username.
    async fn list(&self) -> Result<Vec<PageSummary>, RepoError>;

    /// Pages whose publication date is on or before `today`.
    async fn list_published(&self, today: NaiveDate) -> Result<Vec<PageSummary>, RepoError>;

    /// A page with its blocks ordered by position.
    async fn find_by_id(&self, id: i64) -> Result<Option<Page>, RepoError>;

    /// Insert a page and its blocks.
    async fn create(&self, fields: PageFields, blocks: Vec<NewBlock>) -> Result<Page, RepoError>;

    /// Overwrite the page fields and apply a reconciled block plan.
    async fn update(&self, id: i64, fields: PageFields, plan: ContentPlan)
    -> Result<Page, RepoError>;

    /// Remove a page together with its blocks.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// Site-wide settings.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn title(&self) -> Result<String, RepoError>;

    async fn set_title(&self, title: &str) -> Result<String, RepoError>;
}
