//! 订单与奖品计数的存储接口
//!
//! 服务层只依赖 [`PromotionStore`]。`DbStore` 为 PostgreSQL 实现，
//! `MemoryStore` 为进程内实现。

pub mod database;
pub mod memory;
#[cfg(test)]
pub mod testing;

pub use database::DbStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::models::{NewOrder, Order};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// 唯一约束冲突（phone + date 已存在）
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => StoreError::Conflict(msg),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

#[async_trait]
pub trait PromotionStore: Send + Sync {
    async fn find_orders_by_phone_and_date(
        &self,
        phone: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<Order>>;

    /// 写入新订单；同一 (phone, date) 已存在时返回 `Conflict`
    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order>;

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>>;

    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    /// 返回 None 表示订单不存在
    async fn set_redeemed(&self, id: &str, redeemed: bool) -> StoreResult<Option<Order>>;

    async fn set_note(&self, id: &str, note: &str) -> StoreResult<Option<Order>>;

    async fn prize_counts(&self) -> StoreResult<BTreeMap<String, u32>>;

    /// 原子地占用一个限量名额：count < limit 时 count += 1 并返回 true
    async fn claim_prize_slot(&self, prize_id: &str, limit: u32) -> StoreResult<bool>;

    /// 删除全部订单并清空奖品计数，返回删除的订单数
    async fn clear_all(&self) -> StoreResult<u64>;
}

/// 为存储调用加上超时，避免调用方无限等待
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(timeout)),
    }
}
