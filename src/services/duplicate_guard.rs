use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::store::{PromotionStore, with_timeout};

/// 同一手机号同一天只能登记一次
///
/// 这里是写入前的快速检查；并发提交之间的竞争由存储层的唯一约束兜底，
/// 冲突同样以 `DuplicateEntry` 返回。
#[derive(Clone)]
pub struct DuplicateEntryGuard {
    store: Arc<dyn PromotionStore>,
    timeout: Duration,
}

impl DuplicateEntryGuard {
    pub fn new(store: Arc<dyn PromotionStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn ensure_unique(&self, phone: &str, date: NaiveDate) -> AppResult<()> {
        let existing = with_timeout(
            self.timeout,
            self.store.find_orders_by_phone_and_date(phone, date),
        )
        .await?;

        if !existing.is_empty() {
            return Err(AppError::DuplicateEntry(format!(
                "{phone} 已於 {date} 登記過"
            )));
        }
        Ok(())
    }
}
