use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Products::Tags).string().null())
                    .col(ColumnDef::new(Products::Brand).string().null())
                    .col(ColumnDef::new(Products::Price).double().not_null().default(0.0))
                    .col(ColumnDef::new(Products::Stock).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(ProductCategory::Table, ProductCategory::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    Tags,
    Brand,
    Price,
    Stock,
}

#[derive(DeriveIden)]
enum ProductCategory {
    Table,
    Id,
}
