use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::order_stage::OrderStage;
use super::prize::{AssignedPrize, PrizeKind};

/// 活动订单（一次通过重复检查的登记）
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// 存储层分配的订单ID
    pub id: String,
    pub phone: String,
    /// 到店日期
    pub date: NaiveDate,
    pub branch: String,
    pub room: String,
    pub duration_hours: u32,
    /// 身份提供方给出的用户标识
    pub user_id: String,
    pub is_grand_eligible: bool,
    /// 六位数字，仅 is_grand_eligible 时存在
    pub grand_draw_serial: Option<String>,
    pub assigned_prize_id: String,
    pub assigned_prize_name: String,
    pub assigned_prize_kind: PrizeKind,
    pub redeemed: bool,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn assigned_prize(&self) -> AssignedPrize {
        AssignedPrize {
            id: self.assigned_prize_id.clone(),
            name: self.assigned_prize_name.clone(),
            kind: self.assigned_prize_kind,
        }
    }

    pub fn is_instant_win(&self) -> bool {
        self.assigned_prize_kind == PrizeKind::Win
    }

    /// 由持久化字段推导的阶段（揭晓是前端本地事件，不落库）
    pub fn stage(&self) -> OrderStage {
        if self.redeemed {
            OrderStage::Redeemed
        } else {
            OrderStage::PrizeDetermined
        }
    }
}

/// 待写入的新订单（id 与 created_at 由存储层分配）
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub phone: String,
    pub date: NaiveDate,
    pub branch: String,
    pub room: String,
    pub duration_hours: u32,
    pub user_id: String,
    pub is_grand_eligible: bool,
    pub grand_draw_serial: Option<String>,
    pub prize: AssignedPrize,
}

/// 登记请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrderRequest {
    /// 手机号 09xxxxxxxx
    pub phone: String,
    /// YYYY-MM-DD
    pub date: NaiveDate,
    pub branch: String,
    pub room: String,
    pub duration_hours: u32,
}

/// 登记响应
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrderResponse {
    pub order_id: String,
    pub assigned_prize: AssignedPrize,
    pub grand_draw_serial: Option<String>,
    pub is_grand_eligible: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for RegisterOrderResponse {
    fn from(o: Order) -> Self {
        RegisterOrderResponse {
            assigned_prize: o.assigned_prize(),
            order_id: o.id,
            grand_draw_serial: o.grand_draw_serial,
            is_grand_eligible: o.is_grand_eligible,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRedeemedRequest {
    pub redeemed: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    pub note: String,
}

/// 清空所有订单需附带确认短语
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClearAllRequest {
    pub confirmation: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearAllResponse {
    pub deleted_orders: u64,
}
