//! 订单阶段状态机
//!
//! `Registered -> PrizeDetermined -> Revealed -> Redeemed`。奖品在 `PrizeAssigned`
//! 时固定，之后的事件只改变展示与兑换状态，不改变奖品本身。

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    Registered,
    PrizeDetermined,
    Revealed,
    Redeemed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    PrizeAssigned,
    Revealed,
    RedemptionSet(bool),
}

impl OrderStage {
    pub fn apply(self, event: OrderEvent) -> AppResult<OrderStage> {
        use OrderEvent as E;
        use OrderStage as S;

        let next = match (self, event) {
            (S::Registered, E::PrizeAssigned) => S::PrizeDetermined,
            (S::PrizeDetermined, E::Revealed) | (S::Revealed, E::Revealed) => S::Revealed,
            // 已兑换必然已揭晓，重复揭晓不回退
            (S::Redeemed, E::Revealed) => S::Redeemed,
            (S::PrizeDetermined | S::Revealed | S::Redeemed, E::RedemptionSet(true)) => {
                S::Redeemed
            }
            (S::Redeemed, E::RedemptionSet(false)) => S::Revealed,
            (S::PrizeDetermined | S::Revealed, E::RedemptionSet(false)) => self,
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Cannot apply {event:?} to order in {self:?} stage"
                )));
            }
        };
        Ok(next)
    }
}
