use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WeatherQueries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeatherQueries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WeatherQueries::QueryId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(WeatherQueries::CityName)
                            .string_len(45)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeatherQueries::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(WeatherQueries::Data).text().null())
                    .col(ColumnDef::new(WeatherQueries::CreatedAt).string().not_null())
                    .col(ColumnDef::new(WeatherQueries::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // History is always read newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_weather_queries_created_at")
                    .table(WeatherQueries::Table)
                    .col(WeatherQueries::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WeatherQueries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WeatherQueries {
    Table,
    Id,
    QueryId,
    CityName,
    Status,
    Data,
    CreatedAt,
    UpdatedAt,
}
