use std::sync::Arc;
use std::time::Duration;

use super::OrderService;
use crate::error::{AppError, AppResult};
use crate::models::{CampaignCatalog, Order, PrizeCountResponse};
use crate::store::{PromotionStore, with_timeout};

/// 清空操作必须附带的确认短语
pub const CLEAR_ALL_CONFIRMATION: &str = "CLEAR ALL ORDERS";

/// 后台报表与管理操作
///
/// 报表一次读出全部订单后在内存中筛选排序，按活动规模（数千笔以内）设计。
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn PromotionStore>,
    catalog: Arc<CampaignCatalog>,
    order_service: OrderService,
    timeout: Duration,
}

impl AdminService {
    pub fn new(
        store: Arc<dyn PromotionStore>,
        catalog: Arc<CampaignCatalog>,
        order_service: OrderService,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            order_service,
            timeout,
        }
    }

    /// 大奖名单：is_grand_eligible，按登记时间倒序
    pub async fn list_grand(&self) -> AppResult<Vec<Order>> {
        let orders = self.load_all().await?;
        Ok(newest_first(orders.into_iter().filter(|o| o.is_grand_eligible)))
    }

    /// 即时中奖名单：奖品类型为 WIN，按登记时间倒序
    pub async fn list_instant_wins(&self) -> AppResult<Vec<Order>> {
        let orders = self.load_all().await?;
        Ok(newest_first(orders.into_iter().filter(Order::is_instant_win)))
    }

    pub async fn set_redeemed(&self, order_id: &str, redeemed: bool) -> AppResult<Order> {
        let order = self.order_service.redeem(order_id, redeemed).await?;
        log::info!("Order {order_id} redeemed set to {redeemed}");
        Ok(order)
    }

    pub async fn set_note(&self, order_id: &str, note: &str) -> AppResult<Order> {
        self.order_service.annotate(order_id, note).await
    }

    /// 各限量奖品已发放数量
    pub async fn prize_counts(&self) -> AppResult<Vec<PrizeCountResponse>> {
        let counts = with_timeout(self.timeout, self.store.prize_counts()).await?;
        Ok(self
            .catalog
            .prizes()
            .iter()
            .filter_map(|p| {
                p.inventory_limit.as_option().map(|limit| PrizeCountResponse {
                    prize_id: p.id.clone(),
                    prize_name: p.name.clone(),
                    awarded: counts.get(&p.id).copied().unwrap_or(0),
                    limit,
                })
            })
            .collect())
    }

    /// 删除全部订单并重置奖品计数，不可撤销
    pub async fn clear_all(&self, confirmation: &str) -> AppResult<u64> {
        if confirmation != CLEAR_ALL_CONFIRMATION {
            return Err(AppError::InvalidInput(format!(
                "Confirmation phrase must be \"{CLEAR_ALL_CONFIRMATION}\""
            )));
        }
        let deleted = with_timeout(self.timeout, self.store.clear_all()).await?;
        log::warn!("All orders cleared by administrator: {deleted} deleted");
        Ok(deleted)
    }

    async fn load_all(&self) -> AppResult<Vec<Order>> {
        Ok(with_timeout(self.timeout, self.store.list_orders()).await?)
    }
}

fn newest_first(orders: impl Iterator<Item = Order>) -> Vec<Order> {
    let mut list: Vec<Order> = orders.collect();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    list
}
