//! [`PromotionStore`] 的测试替身

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{MemoryStore, PromotionStore, StoreError, StoreResult};
use crate::models::{AssignedPrize, NewOrder, Order, PrizeKind};

pub fn new_order(phone: &str, date: &str) -> NewOrder {
    NewOrder {
        phone: phone.to_string(),
        date: date.parse().unwrap(),
        branch: "台北信義店".into(),
        room: "A01".into(),
        duration_hours: 2,
        user_id: "user-1".into(),
        is_grand_eligible: false,
        grand_draw_serial: None,
        prize: AssignedPrize {
            id: "none_1".into(),
            name: "銘謝惠顧".into(),
            kind: PrizeKind::None,
        },
    }
}

/// 包装 MemoryStore，可按开关注入故障或延迟
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_claims: AtomicBool,
    pub fail_inserts: AtomicBool,
    pub fail_all: AtomicBool,
    pub delay_ms: AtomicU64,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn gate(&self, flag: &AtomicBool) -> StoreResult<()> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_all.load(Ordering::SeqCst) || flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("permission denied".into()));
        }
        Ok(())
    }

    async fn gate_all(&self) -> StoreResult<()> {
        self.gate(&AtomicBool::new(false)).await
    }
}

#[async_trait]
impl PromotionStore for FlakyStore {
    async fn find_orders_by_phone_and_date(
        &self,
        phone: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<Order>> {
        self.gate_all().await?;
        self.inner.find_orders_by_phone_and_date(phone, date).await
    }

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        self.gate(&self.fail_inserts).await?;
        self.inner.insert_order(order).await
    }

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        self.gate_all().await?;
        self.inner.get_order(id).await
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.gate_all().await?;
        self.inner.list_orders().await
    }

    async fn set_redeemed(&self, id: &str, redeemed: bool) -> StoreResult<Option<Order>> {
        self.gate_all().await?;
        self.inner.set_redeemed(id, redeemed).await
    }

    async fn set_note(&self, id: &str, note: &str) -> StoreResult<Option<Order>> {
        self.gate_all().await?;
        self.inner.set_note(id, note).await
    }

    async fn prize_counts(&self) -> StoreResult<BTreeMap<String, u32>> {
        self.gate_all().await?;
        self.inner.prize_counts().await
    }

    async fn claim_prize_slot(&self, prize_id: &str, limit: u32) -> StoreResult<bool> {
        self.gate(&self.fail_claims).await?;
        self.inner.claim_prize_slot(prize_id, limit).await
    }

    async fn clear_all(&self) -> StoreResult<u64> {
        self.gate_all().await?;
        self.inner.clear_all().await
    }
}
