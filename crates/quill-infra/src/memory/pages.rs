use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use quill_core::RepoError;
use quill_core::domain::{
    ContentBlock, ContentPlan, NewBlock, Page, PageFields, PageStatus, PageSummary,
};
use quill_core::ports::PageRepository;

use super::InMemoryUserRepository;

struct StoredPage {
    fields: PageFields,
    blocks: Vec<ContentBlock>,
}

#[derive(Default)]
struct PageStore {
    pages: BTreeMap<i64, StoredPage>,
    next_page_id: i64,
    next_block_id: i64,
}

impl PageStore {
    fn allocate_page_id(&mut self) -> i64 {
        self.next_page_id += 1;
        self.next_page_id
    }

    fn allocate_blocks(&mut self, blocks: Vec<NewBlock>) -> Vec<ContentBlock> {
        blocks
            .into_iter()
            .map(|block| {
                self.next_block_id += 1;
                ContentBlock::stored(self.next_block_id, block.kind, block.text, block.position)
            })
            .collect()
    }
}

/// Pages held in process memory. Every write takes the store's write lock,
/// so a plan is applied in full or not at all.
pub struct InMemoryPageRepository {
    store: RwLock<PageStore>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPageRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            store: RwLock::new(PageStore::default()),
            users,
        }
    }

    async fn summaries<F>(&self, keep: F) -> Vec<PageSummary>
    where
        F: Fn(&PageFields) -> bool,
    {
        let usernames = self.users.usernames().await;
        let store = self.store.read().await;

        store
            .pages
            .iter()
            .filter(|(_, page)| keep(&page.fields))
            .map(|(id, page)| summary(*id, &page.fields, &usernames))
            .collect()
    }

    async fn snapshot(&self, id: i64, fields: PageFields, mut blocks: Vec<ContentBlock>) -> Page {
        let usernames = self.users.usernames().await;
        blocks.sort_by_key(|b| b.position);

        Page {
            summary: summary(id, &fields, &usernames),
            blocks,
        }
    }
}

fn summary(id: i64, fields: &PageFields, usernames: &BTreeMap<i64, String>) -> PageSummary {
    PageSummary {
        id,
        title: fields.title.clone(),
        author_id: fields.author_id,
        author: usernames.get(&fields.author_id).cloned(),
        creation_date: fields.creation_date,
        publication_date: fields.publication_date,
    }
}

fn apply_plan(page: &mut StoredPage, plan: ContentPlan, created: Vec<ContentBlock>) -> Result<(), RepoError> {
    let owned: HashSet<i64> = page.blocks.iter().filter_map(|b| b.id.stored()).collect();

    let all_known = plan
        .to_delete
        .iter()
        .chain(plan.to_update.iter().map(|u| &u.id))
        .all(|id| owned.contains(id));

    if !all_known {
        return Err(RepoError::NotFound);
    }

    let deleted: HashSet<i64> = plan.to_delete.into_iter().collect();
    page.blocks
        .retain(|b| b.id.stored().is_none_or(|id| !deleted.contains(&id)));

    for update in plan.to_update {
        if let Some(block) = page
            .blocks
            .iter_mut()
            .find(|b| b.id.stored() == Some(update.id))
        {
            block.text = update.text;
            block.position = update.position;
        }
    }

    page.blocks.extend(created);
    page.blocks.sort_by_key(|b| b.position);
    Ok(())
}

#[async_trait]
impl PageRepository for InMemoryPageRepository {
    async fn list(&self) -> Result<Vec<PageSummary>, RepoError> {
        Ok(self.summaries(|_| true).await)
    }

    async fn list_published(&self, today: NaiveDate) -> Result<Vec<PageSummary>, RepoError> {
        Ok(self
            .summaries(|fields| {
                PageStatus::of(fields.publication_date, today) == PageStatus::Published
            })
            .await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Page>, RepoError> {
        let found = {
            let store = self.store.read().await;
            store
                .pages
                .get(&id)
                .map(|page| (page.fields.clone(), page.blocks.clone()))
        };

        match found {
            Some((fields, blocks)) => Ok(Some(self.snapshot(id, fields, blocks).await)),
            None => Ok(None),
        }
    }

    async fn create(&self, fields: PageFields, blocks: Vec<NewBlock>) -> Result<Page, RepoError> {
        let (id, stored) = {
            let mut store = self.store.write().await;
            let id = store.allocate_page_id();
            let stored = store.allocate_blocks(blocks);

            store.pages.insert(
                id,
                StoredPage {
                    fields: fields.clone(),
                    blocks: stored.clone(),
                },
            );
            (id, stored)
        };

        tracing::debug!(page_id = id, "Page created");
        Ok(self.snapshot(id, fields, stored).await)
    }

    async fn update(
        &self,
        id: i64,
        fields: PageFields,
        plan: ContentPlan,
    ) -> Result<Page, RepoError> {
        let blocks = {
            let mut store = self.store.write().await;
            if !store.pages.contains_key(&id) {
                return Err(RepoError::NotFound);
            }

            let created = store.allocate_blocks(plan.to_create.clone());
            let page = store.pages.get_mut(&id).ok_or(RepoError::NotFound)?;
            apply_plan(page, plan, created)?;
            page.fields = fields.clone();
            page.blocks.clone()
        };

        Ok(self.snapshot(id, fields, blocks).await)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store
            .pages
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::{BlockKind, Role, reconcile};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fields(author_id: i64, publication_date: Option<NaiveDate>) -> PageFields {
        PageFields {
            title: "Harbour walk".to_string(),
            author_id,
            creation_date: date(2024, 3, 1),
            publication_date,
        }
    }

    fn new_block(kind: BlockKind, text: &str, position: i32) -> NewBlock {
        NewBlock {
            kind,
            text: text.to_string(),
            position,
        }
    }

    async fn repo() -> InMemoryPageRepository {
        let users = Arc::new(InMemoryUserRepository::new());
        users.insert("ada", "Ada", "hash", Role::Author).await.unwrap();
        InMemoryPageRepository::new(users)
    }

    async fn seeded(repo: &InMemoryPageRepository) -> Page {
        repo.create(
            fields(1, Some(date(2024, 3, 2))),
            vec![
                new_block(BlockKind::Header, "Title", 1),
                new_block(BlockKind::Paragraph, "Body", 2),
            ],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_author() {
        let repo = repo().await;
        let page = seeded(&repo).await;

        assert_eq!(page.id(), 1);
        assert_eq!(page.summary.author.as_deref(), Some("ada"));
        assert_eq!(page.blocks[0].id.stored(), Some(1));
        assert_eq!(page.blocks[1].id.stored(), Some(2));
    }

    #[tokio::test]
    async fn test_update_applies_reconciled_plan() {
        let repo = repo().await;
        let page = seeded(&repo).await;

        let submitted = vec![
            ContentBlock::stored(2, BlockKind::Paragraph, "Body", 1),
            ContentBlock::stored(1, BlockKind::Header, "Title", 2),
            ContentBlock::local("local-1", BlockKind::Image, "/images/harbour.jpg", 3),
        ];
        let plan = reconcile(&page.blocks, &submitted).unwrap();

        let updated = repo
            .update(page.id(), fields(1, Some(date(2024, 3, 2))), plan)
            .await
            .unwrap();

        let order: Vec<_> = updated.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            order,
            vec![BlockKind::Paragraph, BlockKind::Header, BlockKind::Image]
        );
        assert_eq!(updated.blocks[2].id.stored(), Some(3));
    }

    #[tokio::test]
    async fn test_update_with_foreign_block_changes_nothing() {
        let repo = repo().await;
        let page = seeded(&repo).await;

        let plan = ContentPlan {
            to_delete: vec![1, 99],
            ..ContentPlan::default()
        };

        let result = repo.update(page.id(), fields(1, None), plan).await;
        assert!(matches!(result, Err(RepoError::NotFound)));

        let reloaded = repo.find_by_id(page.id()).await.unwrap().unwrap();
        assert_eq!(reloaded, page);
    }

    #[tokio::test]
    async fn test_list_published_skips_drafts_and_scheduled() {
        let repo = repo().await;
        seeded(&repo).await;
        repo.create(fields(1, None), vec![]).await.unwrap();
        repo.create(fields(1, Some(date(2030, 1, 1))), vec![])
            .await
            .unwrap();

        let published = repo.list_published(date(2024, 6, 1)).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let page = seeded(&repo).await;

        repo.delete(page.id()).await.unwrap();
        assert!(repo.find_by_id(page.id()).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(page.id()).await,
            Err(RepoError::NotFound)
        ));
    }
}
