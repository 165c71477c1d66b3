use sea_orm_migration::prelude::*;

/// 活动登记订单（每个 phone + visit_date 至多一条）
#[derive(DeriveIden)]
enum PromoOrders {
    Table,
    Id,
    Phone,
    VisitDate,
    Branch,
    Room,
    DurationHours,
    UserId,
    IsGrandEligible,
    GrandDrawSerial,
    PrizeId,
    PrizeName,
    PrizeKind,
    Redeemed,
    Note,
    CreatedAt,
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
                    .table(PromoOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PromoOrders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PromoOrders::Phone).string_len(16).not_null())
                    .col(ColumnDef::new(PromoOrders::VisitDate).date().not_null())
                    .col(ColumnDef::new(PromoOrders::Branch).string_len(64).not_null())
                    .col(ColumnDef::new(PromoOrders::Room).string_len(64).not_null())
                    .col(
                        ColumnDef::new(PromoOrders::DurationHours)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PromoOrders::UserId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(PromoOrders::IsGrandEligible)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PromoOrders::GrandDrawSerial)
                            .string_len(6)
                            .null(), // 仅 duration_hours >= 4 时存在
                    )
                    .col(ColumnDef::new(PromoOrders::PrizeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PromoOrders::PrizeName)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PromoOrders::PrizeKind).string_len(8).not_null())
                    .col(
                        ColumnDef::new(PromoOrders::Redeemed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PromoOrders::Note)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PromoOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(PromoOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一手机号同一天只能登记一次；并发提交由唯一索引兜底
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_orders_phone_date_unique")
                    .table(PromoOrders::Table)
                    .col(PromoOrders::Phone)
                    .col(PromoOrders::VisitDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_orders_created_at")
                    .table(PromoOrders::Table)
                    .col(PromoOrders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PromoOrders::Table).to_owned())
            .await
    }
}
