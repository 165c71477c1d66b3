use std::sync::Arc;
use std::time::Duration;

use crate::models::{CampaignCatalog, InventoryLimit, PrizeDefinition};
use crate::store::{PromotionStore, with_timeout};

/// 限量奖品的库存检查结果
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryOutcome {
    /// 非限量奖品，或成功占用一个名额
    Awarded(PrizeDefinition),
    /// 已达上限，替换为保底奖品
    Downgraded {
        requested: String,
        awarded: PrizeDefinition,
    },
    /// 计数读取失败，按原奖品发放（不计数）
    Unchecked(PrizeDefinition),
}

impl InventoryOutcome {
    pub fn prize(&self) -> &PrizeDefinition {
        match self {
            InventoryOutcome::Awarded(p)
            | InventoryOutcome::Unchecked(p)
            | InventoryOutcome::Downgraded { awarded: p, .. } => p,
        }
    }

    pub fn into_prize(self) -> PrizeDefinition {
        match self {
            InventoryOutcome::Awarded(p)
            | InventoryOutcome::Unchecked(p)
            | InventoryOutcome::Downgraded { awarded: p, .. } => p,
        }
    }
}

/// 限量奖品上限控制
///
/// 检查与计数是存储层的一次条件自增，并发抽中同一限量奖品不会超发。
/// 存储不可用时放行原奖品，不让登记失败。
#[derive(Clone)]
pub struct InventoryGuard {
    store: Arc<dyn PromotionStore>,
    catalog: Arc<CampaignCatalog>,
    timeout: Duration,
}

impl InventoryGuard {
    pub fn new(
        store: Arc<dyn PromotionStore>,
        catalog: Arc<CampaignCatalog>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            timeout,
        }
    }

    pub async fn secure(&self, selected: &PrizeDefinition) -> InventoryOutcome {
        let InventoryLimit::Limited(limit) = selected.inventory_limit else {
            return InventoryOutcome::Awarded(selected.clone());
        };

        let claim = with_timeout(
            self.timeout,
            self.store.claim_prize_slot(&selected.id, limit),
        )
        .await;

        match claim {
            Ok(true) => InventoryOutcome::Awarded(selected.clone()),
            Ok(false) => {
                let fallback = self.catalog.fallback_prize().clone();
                log::warn!(
                    "Prize {} reached its limit of {limit}, downgraded to {}",
                    selected.id,
                    fallback.id
                );
                InventoryOutcome::Downgraded {
                    requested: selected.id.clone(),
                    awarded: fallback,
                }
            }
            Err(e) => {
                log::warn!(
                    "Prize count for {} unavailable, awarding without cap check: {e}",
                    selected.id
                );
                InventoryOutcome::Unchecked(selected.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Branch, PrizeKind};
    use crate::store::MemoryStore;
    use crate::store::testing::FlakyStore;
    use std::sync::atomic::Ordering;

    fn guard(store: Arc<dyn PromotionStore>) -> (InventoryGuard, Arc<CampaignCatalog>) {
        let catalog = Arc::new(CampaignCatalog::standard());
        (
            InventoryGuard::new(store, catalog.clone(), Duration::from_secs(1)),
            catalog,
        )
    }

    #[tokio::test]
    async fn exhausted_prize_is_downgraded_to_fallback() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..5 {
            store.claim_prize_slot("free_4h", 5).await.unwrap();
        }
        let (guard, catalog) = guard(store.clone());
        let free_4h = catalog.prize("free_4h").unwrap();

        let outcome = guard.secure(free_4h).await;
        assert_eq!(outcome.prize().id, "disc_50");
        assert!(matches!(
            outcome,
            InventoryOutcome::Downgraded { ref requested, .. } if requested == "free_4h"
        ));
        // 计数不因替换而增加
        assert_eq!(store.prize_counts().await.unwrap().get("free_4h"), Some(&5));
    }

    #[tokio::test]
    async fn under_limit_award_is_counted() {
        let store = Arc::new(MemoryStore::new());
        let (guard, catalog) = guard(store.clone());
        let ext_2h = catalog.prize("ext_2h").unwrap();

        let outcome = guard.secure(ext_2h).await;
        assert_eq!(outcome, InventoryOutcome::Awarded(ext_2h.clone()));
        assert_eq!(store.prize_counts().await.unwrap().get("ext_2h"), Some(&1));
    }

    #[tokio::test]
    async fn unlimited_prize_does_not_touch_store() {
        let store = Arc::new(FlakyStore::new());
        store.fail_all.store(true, Ordering::SeqCst);
        let (guard, catalog) = guard(store);
        let none_1 = catalog.prize("none_1").unwrap();

        assert_eq!(
            guard.secure(none_1).await,
            InventoryOutcome::Awarded(none_1.clone())
        );
    }

    #[tokio::test]
    async fn store_failure_fails_open() {
        let store = Arc::new(FlakyStore::new());
        store.fail_claims.store(true, Ordering::SeqCst);
        let (guard, catalog) = guard(store);
        let free_2h = catalog.prize("free_2h").unwrap();

        let outcome = guard.secure(free_2h).await;
        assert_eq!(outcome, InventoryOutcome::Unchecked(free_2h.clone()));
    }

    #[tokio::test]
    async fn slow_store_fails_open_after_timeout() {
        let store = Arc::new(FlakyStore::new());
        store.delay_ms.store(200, Ordering::SeqCst);
        let catalog = Arc::new(CampaignCatalog::standard());
        let guard = InventoryGuard::new(store, catalog.clone(), Duration::from_millis(20));
        let free_2h = catalog.prize("free_2h").unwrap();

        assert!(matches!(
            guard.secure(free_2h).await,
            InventoryOutcome::Unchecked(_)
        ));
    }

    #[tokio::test]
    async fn missing_fallback_uses_first_prize() {
        let prizes = vec![
            PrizeDefinition::new("lose", "Lose", PrizeKind::None, 0.9, InventoryLimit::Unlimited),
            PrizeDefinition::new("big", "Big", PrizeKind::Win, 0.1, InventoryLimit::Limited(0)),
        ];
        let catalog = Arc::new(
            CampaignCatalog::new(
                prizes,
                "disc_50",
                vec![Branch {
                    name: "X".into(),
                    rooms: vec!["1".into()],
                }],
                vec![1],
            )
            .unwrap(),
        );
        let guard = InventoryGuard::new(
            Arc::new(MemoryStore::new()),
            catalog.clone(),
            Duration::from_secs(1),
        );

        let outcome = guard.secure(catalog.prize("big").unwrap()).await;
        assert_eq!(outcome.prize().id, "lose");
    }
}
