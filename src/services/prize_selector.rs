use std::sync::Arc;

use rand::Rng;

use crate::models::{CampaignCatalog, PrizeDefinition};

/// 按概率抽奖
///
/// 累计概率表在构造时计算一次。奖品 i 的区间为
/// `[cumulative[i-1], cumulative[i])`，r 恰好落在边界时归属下一项；
/// r 超出所有累计值（浮点误差）时取最后一项。
#[derive(Clone)]
pub struct WeightedPrizeSelector {
    prizes: Arc<[PrizeDefinition]>,
    cumulative: Arc<[f64]>,
}

impl WeightedPrizeSelector {
    pub fn new(catalog: &CampaignCatalog) -> Self {
        let prizes: Arc<[PrizeDefinition]> = catalog.prizes().into();
        let cumulative = prizes
            .iter()
            .scan(0.0_f64, |acc, p| {
                *acc += p.probability;
                Some(*acc)
            })
            .collect();
        Self { prizes, cumulative }
    }

    /// 累计概率上界（与奖品顺序一致）
    pub fn boundaries(&self) -> &[f64] {
        &self.cumulative
    }

    /// 给定 r ∈ [0, 1) 返回对应奖品
    pub fn select(&self, r: f64) -> &PrizeDefinition {
        let idx = self.cumulative.partition_point(|&upper| upper <= r);
        let last = self.prizes.len() - 1;
        &self.prizes[idx.min(last)]
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &PrizeDefinition {
        self.select(rng.r#gen::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn selector() -> WeightedPrizeSelector {
        WeightedPrizeSelector::new(&CampaignCatalog::standard())
    }

    #[test]
    fn selects_interval_containing_r() {
        let s = selector();
        assert_eq!(s.select(0.0).id, "none_1");
        assert_eq!(s.select(0.2).id, "none_1");
        assert_eq!(s.select(0.5).id, "none_2");
        assert_eq!(s.select(0.8).id, "ext_1h");
        assert_eq!(s.select(0.9).id, "disc_50");
        assert_eq!(s.select(0.97).id, "ext_2h");
        assert_eq!(s.select(0.996).id, "free_2h");
        assert_eq!(s.select(0.9995).id, "free_4h");
    }

    #[test]
    fn boundary_selects_next_prize() {
        let s = selector();
        let catalog = CampaignCatalog::standard();
        let prizes = catalog.prizes();
        let bounds = s.boundaries();
        for i in 0..bounds.len() - 1 {
            assert_eq!(s.select(bounds[i]).id, prizes[i + 1].id);
            assert_eq!(s.select(bounds[i] - 1e-9).id, prizes[i].id);
        }
    }

    #[test]
    fn drift_above_all_sums_selects_last() {
        let s = selector();
        assert_eq!(s.select(1.0).id, "free_4h");
        assert_eq!(s.select(1.5).id, "free_4h");
    }

    #[test]
    fn frequencies_match_probabilities() {
        let s = selector();
        let mut rng = StdRng::seed_from_u64(20250201);
        let draws = 100_000;
        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(s.draw(&mut rng).id.clone()).or_default() += 1;
        }

        for p in CampaignCatalog::standard().prizes() {
            let observed = f64::from(counts.get(&p.id).copied().unwrap_or(0)) / draws as f64;
            assert!(
                (observed - p.probability).abs() < 0.01,
                "{}: observed {observed}, expected {}",
                p.id,
                p.probability
            );
        }
    }
}
