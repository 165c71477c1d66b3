use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

use crate::models::{Order, PrizeKind};

/// 活动订单实体
/// - (phone, visit_date) 唯一
/// - prize_* 为登记时的奖品快照，之后不再重算
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "promo_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phone: String,
    pub visit_date: NaiveDate,
    pub branch: String,
    pub room: String,
    pub duration_hours: i32,
    pub user_id: String,
    pub is_grand_eligible: bool,
    pub grand_draw_serial: Option<String>,
    pub prize_id: String,
    pub prize_name: String,
    pub prize_kind: PrizeKind,
    pub redeemed: bool,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(m: Model) -> Self {
        Order {
            id: m.id.to_string(),
            phone: m.phone,
            date: m.visit_date,
            branch: m.branch,
            room: m.room,
            duration_hours: m.duration_hours.max(0) as u32,
            user_id: m.user_id,
            is_grand_eligible: m.is_grand_eligible,
            grand_draw_serial: m.grand_draw_serial,
            assigned_prize_id: m.prize_id,
            assigned_prize_name: m.prize_name,
            assigned_prize_kind: m.prize_kind,
            redeemed: m.redeemed,
            note: m.note,
            created_at: m.created_at,
        }
    }
}
