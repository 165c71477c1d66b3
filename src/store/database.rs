use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::{PromotionStore, StoreResult};
use crate::entities::{prize_count_entity as counts, promo_order_entity as orders};
use crate::models::{NewOrder, Order};

/// PostgreSQL 存储 (sea-orm)
#[derive(Clone)]
pub struct DbStore {
    pool: DatabaseConnection,
}

impl DbStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(orders::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(Into::into))
    }
}

/// 非法 UUID 视为不存在的订单
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[async_trait]
impl PromotionStore for DbStore {
    async fn find_orders_by_phone_and_date(
        &self,
        phone: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<Order>> {
        let list = orders::Entity::find()
            .filter(orders::Column::Phone.eq(phone))
            .filter(orders::Column::VisitDate.eq(date))
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        let now = Utc::now();
        // 唯一索引冲突会经 From<DbErr> 转为 StoreError::Conflict
        let model = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(order.phone),
            visit_date: Set(order.date),
            branch: Set(order.branch),
            room: Set(order.room),
            duration_hours: Set(order.duration_hours as i32),
            user_id: Set(order.user_id),
            is_grand_eligible: Set(order.is_grand_eligible),
            grand_draw_serial: Set(order.grand_draw_serial),
            prize_id: Set(order.prize.id),
            prize_name: Set(order.prize.name),
            prize_kind: Set(order.prize.kind),
            redeemed: Set(false),
            note: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;
        Ok(model.into())
    }

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        match parse_id(id) {
            Some(uuid) => self.find_by_id(uuid).await,
            None => Ok(None),
        }
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let list = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn set_redeemed(&self, id: &str, redeemed: bool) -> StoreResult<Option<Order>> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Redeemed, Expr::value(redeemed))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(uuid))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(uuid).await
    }

    async fn set_note(&self, id: &str, note: &str) -> StoreResult<Option<Order>> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Note, Expr::value(note))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(uuid))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(uuid).await
    }

    async fn prize_counts(&self) -> StoreResult<BTreeMap<String, u32>> {
        let rows = counts::Entity::find().all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.prize_id, r.awarded_count.max(0) as u32))
            .collect())
    }

    async fn claim_prize_slot(&self, prize_id: &str, limit: u32) -> StoreResult<bool> {
        // 计数行不存在时先补一行 0
        counts::Entity::insert(counts::ActiveModel {
            prize_id: Set(prize_id.to_string()),
            awarded_count: Set(0),
            updated_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(counts::Column::PrizeId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        // 条件自增: update where awarded_count < limit
        let result = counts::Entity::update_many()
            .col_expr(
                counts::Column::AwardedCount,
                Expr::col(counts::Column::AwardedCount).add(1),
            )
            .col_expr(counts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(counts::Column::PrizeId.eq(prize_id))
            .filter(counts::Column::AwardedCount.lt(limit as i32))
            .exec(&self.pool)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn clear_all(&self) -> StoreResult<u64> {
        let txn = self.pool.begin().await?;
        let deleted = orders::Entity::delete_many().exec(&txn).await?.rows_affected;
        counts::Entity::delete_many().exec(&txn).await?;
        txn.commit().await?;
        Ok(deleted)
    }
}
