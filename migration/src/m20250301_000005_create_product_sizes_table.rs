use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductSizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductSizes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductSizes::ProductId).integer().not_null())
                    .col(ColumnDef::new(ProductSizes::Size).string().null())
                    .col(ColumnDef::new(ProductSizes::Quantity).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_sizes_product_id")
                            .from(ProductSizes::Table, ProductSizes::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_sizes_product_id")
                    .table(ProductSizes::Table)
                    .col(ProductSizes::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductSizes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductSizes {
    Table,
    Id,
    ProductId,
    Size,
    Quantity,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}
