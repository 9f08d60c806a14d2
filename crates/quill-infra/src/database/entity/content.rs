//! Content block entity for SeaORM.

use sea_orm::entity::prelude::*;

use quill_core::RepoError;
use quill_core::domain::{BlockKind, ContentBlock};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub page_id: i64,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::page::Entity",
        from = "Column::PageId",
        to = "super::page::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Page,
}

impl Related<super::page::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Page.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ContentBlock {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind: BlockKind = model
            .kind
            .parse()
            .map_err(|e: quill_core::domain::UnknownBlockKind| RepoError::Query(e.to_string()))?;

        Ok(ContentBlock::stored(model.id, kind, model.text, model.position))
    }
}
