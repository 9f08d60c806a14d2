//! Page entity for SeaORM.

use sea_orm::entity::prelude::*;

use quill_core::domain::PageSummary;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub creation_date: Date,
    pub publication_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::content::Entity")]
    Content,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Page summary, with the author's username when it was joined in.
    pub fn into_summary(self, author: Option<super::user::Model>) -> PageSummary {
        PageSummary {
            id: self.id,
            title: self.title,
            author_id: self.author_id,
            author: author.map(|a| a.username),
            creation_date: self.creation_date,
            publication_date: self.publication_date,
        }
    }
}
