use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductMedia::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductMedia::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductMedia::ProductId).integer().not_null())
                    .col(ColumnDef::new(ProductMedia::FileUrl).string().not_null())
                    .col(ColumnDef::new(ProductMedia::FileType).string().not_null())
                    // No cascade: the write pipeline removes media rows itself.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_media_product_id")
                            .from(ProductMedia::Table, ProductMedia::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_media_product_id")
                    .table(ProductMedia::Table)
                    .col(ProductMedia::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductMedia::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductMedia {
    Table,
    Id,
    ProductId,
    FileUrl,
    FileType,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}
