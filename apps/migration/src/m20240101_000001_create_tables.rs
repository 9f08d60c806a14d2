use sea_orm_migration::prelude::*;

const DEFAULT_SITE_TITLE: &str = "Quill";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("author"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pages::Title).string_len(160).not_null())
                    .col(ColumnDef::new(Pages::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Pages::CreationDate).date().not_null())
                    .col(ColumnDef::new(Pages::PublicationDate).date().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pages_author")
                            .from(Pages::Table, Pages::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pages_publication_date")
                    .table(Pages::Table)
                    .col(Pages::PublicationDate)
                    .to_owned(),
            )
            .await?;

        // No unique index on (page_id, position): a reorder swaps positions
        // row by row inside one transaction.
        manager
            .create_table(
                Table::create()
                    .table(Contents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contents::PageId).big_integer().not_null())
                    .col(ColumnDef::new(Contents::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Contents::Text).text().not_null())
                    .col(ColumnDef::new(Contents::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contents_page")
                            .from(Contents::Table, Contents::PageId)
                            .to(Pages::Table, Pages::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contents_page_position")
                    .table(Contents::Table)
                    .col(Contents::PageId)
                    .col(Contents::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Images::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Images::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Images::Name).string().not_null())
                    .col(ColumnDef::new(Images::Path).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Site::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Site::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Site::Title).string_len(160).not_null())
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Site::Table)
            .columns([Site::Title])
            .values([DEFAULT_SITE_TITLE.into()])
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Site::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Images::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Name,
    PasswordHash,
    Role,
}

#[derive(DeriveIden)]
enum Pages {
    Table,
    Id,
    Title,
    AuthorId,
    CreationDate,
    PublicationDate,
}

#[derive(DeriveIden)]
enum Contents {
    Table,
    Id,
    PageId,
    Kind,
    Text,
    Position,
}

#[derive(DeriveIden)]
enum Images {
    Table,
    Id,
    Name,
    Path,
}

#[derive(DeriveIden)]
enum Site {
    Table,
    Id,
    Title,
}
