use sea_orm_migration::prelude::*;

/// 限量奖品已发放次数（prize_id -> awarded_count）
#[derive(DeriveIden)]
enum PrizeCounts {
    Table,
    PrizeId,
    AwardedCount,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PrizeCounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrizeCounts::PrizeId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrizeCounts::AwardedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PrizeCounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrizeCounts::Table).to_owned())
            .await
    }
}
