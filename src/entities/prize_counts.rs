use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 限量奖品发放计数
/// 仅在 awarded_count < limit 时原子自增；只有全量清空会重置
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "prize_counts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub prize_id: String,
    pub awarded_count: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
