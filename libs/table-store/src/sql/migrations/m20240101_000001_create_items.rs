use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Pk).text().not_null())
                    .col(ColumnDef::new(Items::Sk).text().not_null())
                    .col(ColumnDef::new(Items::Gsi1pk).text().null())
                    .col(ColumnDef::new(Items::Gsi1sk).text().null())
                    .col(ColumnDef::new(Items::Gsi2pk).text().null())
                    .col(ColumnDef::new(Items::Gsi2sk).text().null())
                    .col(ColumnDef::new(Items::Body).text().not_null())
                    .primary_key(Index::create().col(Items::Pk).col(Items::Sk))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_items_gsi1")
                    .table(Items::Table)
                    .col(Items::Gsi1pk)
                    .col(Items::Gsi1sk)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_items_gsi2")
                    .table(Items::Table)
                    .col(Items::Gsi2pk)
                    .col(Items::Gsi2sk)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Pk,
    Sk,
    Gsi1pk,
    Gsi1sk,
    Gsi2pk,
    Gsi2sk,
    Body,
}
