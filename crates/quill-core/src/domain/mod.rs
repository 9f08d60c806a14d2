//! Domain entities - the core business objects.

mod block;
pub mod editor;
mod page;
pub mod reconcile;
mod site;
mod user;

pub use block::{BlockId, BlockKind, ContentBlock, UnknownBlockKind};
pub use editor::BlockEditor;
pub use page::{
    Page, PageDraft, PageFields, PageStatus, PageSummary, TITLE_MAX_CHARS, TITLE_MIN_CHARS,
    sort_by_publication_date, validate_title,
};
pub use reconcile::{BlockUpdate, ContentPlan, NewBlock, reconcile};
pub use site::{DEFAULT_SITE_TITLE, Image};
pub use user::{Role, User};
