use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PromotionStore, StoreError, StoreResult};
use crate::models::{NewOrder, Order};

#[derive(Default)]
struct State {
    orders: HashMap<String, Order>,
    prize_counts: BTreeMap<String, u32>,
    last_created_at: Option<DateTime<Utc>>,
}

/// 进程内存储（开发环境与测试）
///
/// 所有写操作在同一把写锁内完成，重复检查与写入、名额检查与计数均为原子操作。
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    /// created_at 严格递增，保证按时间倒序时顺序确定
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }
}

#[async_trait]
impl PromotionStore for MemoryStore {
    async fn find_orders_by_phone_and_date(
        &self,
        phone: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .filter(|o| o.phone == phone && o.date == date)
            .cloned()
            .collect())
    }

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut state = self.state.write().await;

        if state
            .orders
            .values()
            .any(|o| o.phone == order.phone && o.date == order.date)
        {
            return Err(StoreError::Conflict(format!(
                "{} already registered on {}",
                order.phone, order.date
            )));
        }

        let created = Order {
            id: Uuid::new_v4().to_string(),
            phone: order.phone,
            date: order.date,
            branch: order.branch,
            room: order.room,
            duration_hours: order.duration_hours,
            user_id: order.user_id,
            is_grand_eligible: order.is_grand_eligible,
            grand_draw_serial: order.grand_draw_serial,
            assigned_prize_id: order.prize.id,
            assigned_prize_name: order.prize.name,
            assigned_prize_kind: order.prize.kind,
            redeemed: false,
            note: String::new(),
            created_at: state.next_created_at(),
        };
        state.orders.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(id).cloned())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.state.read().await.orders.values().cloned().collect())
    }

    async fn set_redeemed(&self, id: &str, redeemed: bool) -> StoreResult<Option<Order>> {
        let mut state = self.state.write().await;
        Ok(state.orders.get_mut(id).map(|o| {
            o.redeemed = redeemed;
            o.clone()
        }))
    }

    async fn set_note(&self, id: &str, note: &str) -> StoreResult<Option<Order>> {
        let mut state = self.state.write().await;
        Ok(state.orders.get_mut(id).map(|o| {
            o.note = note.to_string();
            o.clone()
        }))
    }

    async fn prize_counts(&self) -> StoreResult<BTreeMap<String, u32>> {
        Ok(self.state.read().await.prize_counts.clone())
    }

    async fn claim_prize_slot(&self, prize_id: &str, limit: u32) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let count = state.prize_counts.entry(prize_id.to_string()).or_insert(0);
        if *count >= limit {
            return Ok(false);
        }
        *count += 1;
        Ok(true)
    }

    async fn clear_all(&self) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let deleted = state.orders.len() as u64;
        state.orders.clear();
        state.prize_counts.clear();
        Ok(deleted)
    }
}
