//! Page listing, retrieval and editing.
//!
//! Updates and deletes of one page are serialized through the page lock,
//! so the stored blocks a plan is computed from cannot change before the
//! plan is applied.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;

use quill_core::DomainError;
use quill_core::domain::{PageSummary, reconcile, sort_by_publication_date};
use quill_core::ports::BaseRepository;
use quill_shared::dto::{PageRequest, PageResponse, PageSummaryResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn page_not_found(id: i64) -> AppError {
    DomainError::NotFound {
        entity_type: "Page",
        id,
    }
    .into()
}

fn listing(mut pages: Vec<PageSummary>, today: NaiveDate) -> Vec<PageSummaryResponse> {
    sort_by_publication_date(&mut pages);
    pages
        .into_iter()
        .map(|page| PageSummaryResponse::new(page, today))
        .collect()
}

/// Authors write only under their own name; admins may name any existing
/// user as author.
async fn check_author(state: &AppState, identity: &Identity, author_id: i64) -> AppResult<()> {
    if !identity.is_admin() {
        return if author_id == identity.user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        };
    }

    match state.users.find_by_id(author_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Validation(format!(
            "author {} does not exist",
            author_id
        ))),
    }
}

/// GET /api/pages
pub async fn list_pages(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let pages = state.pages.list().await?;
    Ok(HttpResponse::Ok().json(listing(pages, state.today())))
}

/// GET /api/pages/published
pub async fn list_published(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let today = state.today();
    let pages = state.pages.list_published(today).await?;
    Ok(HttpResponse::Ok().json(listing(pages, today)))
}

/// GET /api/pages/{id}
pub async fn get_page(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let today = state.today();

    let page = state
        .pages
        .find_by_id(id)
        .await?
        .ok_or_else(|| page_not_found(id))?;

    if identity.0.is_none() && !page.is_visible_to_public(today) {
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(PageResponse::new(page, today)))
}

/// POST /api/pages
pub async fn create_page(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PageRequest>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().into_draft();

    check_author(&state, &identity, draft.fields.author_id).await?;
    draft.validate()?;

    let plan = reconcile(&[], &draft.blocks)?;
    let page = state.pages.create(draft.fields, plan.to_create).await?;

    tracing::info!(
        page_id = page.id(),
        blocks = page.blocks.len(),
        user = %identity.username,
        "Page created"
    );

    Ok(HttpResponse::Created().json(PageResponse::new(page, state.today())))
}

/// PUT /api/pages/{id}
pub async fn update_page(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<PageRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let request = body.into_inner();

    if request.id.is_some_and(|body_id| body_id != id) {
        return Err(AppError::Validation(
            "page id in the body does not match the URL".to_string(),
        ));
    }

    let draft = request.into_draft();
    let _guard = state.page_locks.acquire(id).await;

    let existing = state
        .pages
        .find_by_id(id)
        .await?
        .ok_or_else(|| page_not_found(id))?;

    if !identity.can_manage(&existing.summary) {
        return Err(AppError::Forbidden);
    }
    draft.validate()?;
    if draft.fields.author_id != existing.summary.author_id {
        check_author(&state, &identity, draft.fields.author_id).await?;
    }

    let plan = reconcile(&existing.blocks, &draft.blocks)?;
    tracing::debug!(
        page_id = id,
        created = plan.to_create.len(),
        updated = plan.to_update.len(),
        deleted = plan.to_delete.len(),
        unchanged = plan.unchanged.len(),
        "Applying content plan"
    );

    let page = state.pages.update(id, draft.fields, plan).await?;
    tracing::info!(page_id = id, user = %identity.username, "Page updated");

    Ok(HttpResponse::Ok().json(PageResponse::new(page, state.today())))
}

/// DELETE /api/pages/{id}
pub async fn delete_page(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let _guard = state.page_locks.acquire(id).await;

    let existing = state
        .pages
        .find_by_id(id)
        .await?
        .ok_or_else(|| page_not_found(id))?;

    if !identity.can_manage(&existing.summary) {
        return Err(AppError::Forbidden);
    }

    state.pages.delete(id).await?;

    tracing::info!(page_id = id, user = %identity.username, "Page deleted");
    Ok(HttpResponse::NoContent().finish())
}
