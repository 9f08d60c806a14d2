//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

use quill_core::RepoError;
use quill_core::domain::{
    ContentBlock, ContentPlan, DEFAULT_SITE_TITLE, NewBlock, Page, PageFields, PageSummary, User,
};
use quill_core::ports::{ImageRepository, PageRepository, SiteRepository, UserRepository};

use super::entity::content::{self, Entity as ContentEntity};
use super::entity::image::Entity as ImageEntity;
use super::entity::page::{self, Entity as PageEntity};
use super::entity::site::{self, Entity as SiteEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL image catalogue.
pub type PostgresImageRepository = PostgresBaseRepository<ImageEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        result.map(User::try_from).transpose()
    }
}

impl ImageRepository for PostgresImageRepository {}

/// PostgreSQL page repository. Pages and their content rows are written
/// inside one transaction per call.
pub struct PostgresPageRepository {
    db: DbConn,
}

impl PostgresPageRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

async fn load_page<C>(conn: &C, id: i64) -> Result<Option<Page>, RepoError>
where
    C: ConnectionTrait,
{
    let Some((model, author)) = PageEntity::find_by_id(id)
        .find_also_related(UserEntity)
        .one(conn)
        .await
        .map_err(repo_error)?
    else {
        return Ok(None);
    };

    let blocks = ContentEntity::find()
        .filter(content::Column::PageId.eq(id))
        .order_by_asc(content::Column::Position)
        .all(conn)
        .await
        .map_err(repo_error)?
        .into_iter()
        .map(ContentBlock::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Page {
        summary: model.into_summary(author),
        blocks,
    }))
}

async fn insert_blocks<C>(conn: &C, page_id: i64, blocks: Vec<NewBlock>) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    for block in blocks {
        content::ActiveModel {
            page_id: Set(page_id),
            kind: Set(block.kind.as_str().to_string()),
            text: Set(block.text),
            position: Set(block.position),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(repo_error)?;
    }
    Ok(())
}

fn apply_fields(model: &mut page::ActiveModel, fields: PageFields) {
    model.title = Set(fields.title);
    model.author_id = Set(fields.author_id);
    model.creation_date = Set(fields.creation_date);
    model.publication_date = Set(fields.publication_date);
}

#[async_trait]
impl PageRepository for PostgresPageRepository {
    async fn list(&self) -> Result<Vec<PageSummary>, RepoError> {
        let rows = PageEntity::find()
            .find_also_related(UserEntity)
            .order_by_asc(page::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows
            .into_iter()
            .map(|(page, author)| page.into_summary(author))
            .collect())
    }

    async fn list_published(&self, today: NaiveDate) -> Result<Vec<PageSummary>, RepoError> {
        let rows = PageEntity::find()
            .find_also_related(UserEntity)
            .filter(page::Column::PublicationDate.is_not_null())
            .filter(page::Column::PublicationDate.lte(today))
            .order_by_asc(page::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows
            .into_iter()
            .map(|(page, author)| page.into_summary(author))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Page>, RepoError> {
        load_page(&self.db, id).await
    }

    async fn create(&self, fields: PageFields, blocks: Vec<NewBlock>) -> Result<Page, RepoError> {
        let txn = self.db.begin().await.map_err(repo_error)?;

        let mut model = page::ActiveModel {
            ..Default::default()
        };
        apply_fields(&mut model, fields);
        let inserted = model.insert(&txn).await.map_err(repo_error)?;

        insert_blocks(&txn, inserted.id, blocks).await?;

        let page = load_page(&txn, inserted.id).await?.ok_or(RepoError::NotFound)?;
        txn.commit().await.map_err(repo_error)?;

        tracing::debug!(page_id = inserted.id, "Page created");
        Ok(page)
    }

    async fn update(
        &self,
        id: i64,
        fields: PageFields,
        plan: ContentPlan,
    ) -> Result<Page, RepoError> {
        // Dropping the transaction on an early return rolls everything back.
        let txn = self.db.begin().await.map_err(repo_error)?;

        let existing = PageEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(repo_error)?
            .ok_or(RepoError::NotFound)?;
        let mut model: page::ActiveModel = existing.into();
        apply_fields(&mut model, fields);
        model.update(&txn).await.map_err(repo_error)?;

        if !plan.to_delete.is_empty() {
            let expected = plan.to_delete.len() as u64;
            let result = ContentEntity::delete_many()
                .filter(content::Column::PageId.eq(id))
                .filter(content::Column::Id.is_in(plan.to_delete))
                .exec(&txn)
                .await
                .map_err(repo_error)?;

            if result.rows_affected != expected {
                return Err(RepoError::NotFound);
            }
        }

        for update in plan.to_update {
            let result = ContentEntity::update_many()
                .col_expr(content::Column::Text, Expr::value(update.text))
                .col_expr(content::Column::Position, Expr::value(update.position))
                .filter(content::Column::Id.eq(update.id))
                .filter(content::Column::PageId.eq(id))
                .exec(&txn)
                .await
                .map_err(repo_error)?;

            if result.rows_affected != 1 {
                return Err(RepoError::NotFound);
            }
        }

        insert_blocks(&txn, id, plan.to_create).await?;

        let page = load_page(&txn, id).await?.ok_or(RepoError::NotFound)?;
        txn.commit().await.map_err(repo_error)?;

        Ok(page)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(repo_error)?;

        ContentEntity::delete_many()
            .filter(content::Column::PageId.eq(id))
            .exec(&txn)
            .await
            .map_err(repo_error)?;

        let result = PageEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(repo_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(repo_error)?;
        Ok(())
    }
}

/// PostgreSQL site settings.
pub struct PostgresSiteRepository {
    db: DbConn,
}

impl PostgresSiteRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SiteRepository for PostgresSiteRepository {
    async fn title(&self) -> Result<String, RepoError> {
        let row = SiteEntity::find()
            .order_by_asc(site::Column::Id)
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(row.map_or_else(|| DEFAULT_SITE_TITLE.to_string(), |s| s.title))
    }

    async fn set_title(&self, title: &str) -> Result<String, RepoError> {
        let existing = SiteEntity::find()
            .order_by_asc(site::Column::Id)
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        let saved = match existing {
            Some(row) => {
                let mut model: site::ActiveModel = row.into();
                model.title = Set(title.to_string());
                model.update(&self.db).await
            }
            None => {
                site::ActiveModel {
                    title: Set(title.to_string()),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(repo_error)?;

        Ok(saved.title)
    }
}
