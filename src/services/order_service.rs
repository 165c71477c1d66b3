use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DuplicateEntryGuard, GrandDrawAssigner, InventoryGuard, WeightedPrizeSelector};
use crate::error::{AppError, AppResult};
use crate::models::{
    AssignedPrize, CampaignCatalog, NewOrder, Order, OrderEvent, OrderStage, RegisterOrderRequest,
};
use crate::store::{PromotionStore, with_timeout};
use crate::utils::{normalize_mobile_phone, validate_mobile_phone};

/// 备注最大长度（字符）
pub const MAX_NOTE_CHARS: usize = 500;

/// 用户标识最大长度（与 promo_orders.user_id 列宽一致）
pub const MAX_USER_ID_CHARS: usize = 128;

/// 订单生命周期：登记（唯一的决策点）、兑换状态与备注
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn PromotionStore>,
    catalog: Arc<CampaignCatalog>,
    selector: WeightedPrizeSelector,
    inventory_guard: InventoryGuard,
    duplicate_guard: DuplicateEntryGuard,
    timeout: Duration,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn PromotionStore>,
        catalog: Arc<CampaignCatalog>,
        timeout: Duration,
    ) -> Self {
        Self {
            selector: WeightedPrizeSelector::new(&catalog),
            inventory_guard: InventoryGuard::new(store.clone(), catalog.clone(), timeout),
            duplicate_guard: DuplicateEntryGuard::new(store.clone(), timeout),
            store,
            catalog,
            timeout,
        }
    }

    pub fn catalog(&self) -> &CampaignCatalog {
        &self.catalog
    }

    /// 登记
    ///
    /// 逻辑:
    /// 1. 校验手机号、分店/包厢、时长
    /// 2. 同一 phone + date 不可重复
    /// 3. 判定大奖资格并发放序号
    /// 4. 按概率抽奖，限量奖品经库存检查（可能替换为保底奖品）
    /// 5. 写入订单（redeemed = false, note = ""）
    /// 6. 返回订单，其中奖品与序号此后不再变更
    pub async fn register(&self, user_id: &str, request: RegisterOrderRequest) -> AppResult<Order> {
        let mut rng = StdRng::from_entropy();
        self.register_with_rng(user_id, request, &mut rng).await
    }

    pub async fn register_with_rng<R: Rng + Send + ?Sized>(
        &self,
        user_id: &str,
        request: RegisterOrderRequest,
        rng: &mut R,
    ) -> AppResult<Order> {
        let phone = normalize_mobile_phone(&request.phone);
        validate_mobile_phone(&phone)?;
        self.validate_visit(user_id, &request)?;

        self.duplicate_guard
            .ensure_unique(&phone, request.date)
            .await?;

        let grand = GrandDrawAssigner::assign(request.duration_hours, &mut *rng);

        let selected = self.selector.draw(&mut *rng).clone();
        let prize = self.inventory_guard.secure(&selected).await.into_prize();
        // 奖品自此固定
        let stage = OrderStage::Registered.apply(OrderEvent::PrizeAssigned)?;

        let new_order = NewOrder {
            phone,
            date: request.date,
            branch: request.branch,
            room: request.room,
            duration_hours: request.duration_hours,
            user_id: user_id.to_string(),
            is_grand_eligible: grand.is_eligible,
            grand_draw_serial: grand.serial,
            prize: AssignedPrize::from(&prize),
        };

        let order = with_timeout(self.timeout, self.store.insert_order(new_order))
            .await
            .map_err(|e| {
                log::error!("Failed to persist order: {e}");
                AppError::from(e)
            })?;

        log::info!(
            "Order registered: id={} prize={} grand_eligible={} stage={stage:?}",
            order.id,
            order.assigned_prize_id,
            order.is_grand_eligible
        );
        Ok(order)
    }

    /// 设置兑换状态（幂等）
    pub async fn redeem(&self, order_id: &str, redeemed: bool) -> AppResult<Order> {
        let current = with_timeout(self.timeout, self.store.get_order(order_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;
        current.stage().apply(OrderEvent::RedemptionSet(redeemed))?;

        with_timeout(self.timeout, self.store.set_redeemed(order_id, redeemed))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))
    }

    /// 更新备注（幂等，后写覆盖）
    pub async fn annotate(&self, order_id: &str, note: &str) -> AppResult<Order> {
        if note.chars().count() > MAX_NOTE_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Note exceeds {MAX_NOTE_CHARS} characters"
            )));
        }

        with_timeout(self.timeout, self.store.set_note(order_id, note))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))
    }

    fn validate_visit(&self, user_id: &str, request: &RegisterOrderRequest) -> AppResult<()> {
        if user_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Missing user identity".into()));
        }
        if user_id.chars().count() > MAX_USER_ID_CHARS {
            return Err(AppError::InvalidInput(format!(
                "User identity exceeds {MAX_USER_ID_CHARS} characters"
            )));
        }

        let rooms = self
            .catalog
            .rooms_of(&request.branch)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown branch: {}", request.branch)))?;
        if !rooms.iter().any(|r| *r == request.room) {
            return Err(AppError::InvalidInput(format!(
                "Room {} does not belong to {}",
                request.room, request.branch
            )));
        }

        if !self.catalog.is_allowed_duration(request.duration_hours) {
            return Err(AppError::InvalidInput(format!(
                "Duration {} hours is not offered",
                request.duration_hours
            )));
        }
        Ok(())
    }
}
