use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductCategory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductCategory::Name).string().not_null())
                    .col(ColumnDef::new(ProductCategory::NameEn).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Category pairs are upserted with ON CONFLICT against this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category_name_pair")
                    .table(ProductCategory::Table)
                    .col(ProductCategory::Name)
                    .col(ProductCategory::NameEn)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductCategory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductCategory {
    Table,
    Id,
    Name,
    NameEn,
}
