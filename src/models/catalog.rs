use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::prize::{InventoryLimit, PrizeDefinition, PrizeKind, PrizeResponse};
use crate::config::ScratchConfig;
use crate::error::{AppError, AppResult};

/// 概率和允许的舍入误差
const PROBABILITY_EPSILON: f64 = 1e-6;

/// 默认保底奖品（限量奖品库存耗尽时替换）
pub const DEFAULT_FALLBACK_PRIZE_ID: &str = "disc_50";

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub name: String,
    pub rooms: Vec<String>,
}

impl Branch {
    fn new(name: &str, rooms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            rooms: rooms.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// 活动目录：奖品表、分店与包厢、可选时长
///
/// 启动时构建一次，之后以 `Arc<CampaignCatalog>` 显式传入各组件。
/// `prizes` 的顺序即累计概率的遍历顺序，最后一项吸收浮点误差。
#[derive(Debug, Clone)]
pub struct CampaignCatalog {
    prizes: Vec<PrizeDefinition>,
    fallback_prize_id: String,
    branches: Vec<Branch>,
    allowed_durations: Vec<u32>,
}

impl CampaignCatalog {
    pub fn new(
        prizes: Vec<PrizeDefinition>,
        fallback_prize_id: &str,
        branches: Vec<Branch>,
        allowed_durations: Vec<u32>,
    ) -> AppResult<Self> {
        let catalog = Self {
            prizes,
            fallback_prize_id: fallback_prize_id.to_string(),
            branches,
            allowed_durations,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// 本次活动的固定配置
    pub fn standard() -> Self {
        use InventoryLimit::{Limited, Unlimited};
        use PrizeKind::{None, Win};

        Self {
            prizes: vec![
                PrizeDefinition::new("none_1", "銘謝惠顧", None, 0.38, Unlimited),
                PrizeDefinition::new("none_2", "下次再加油", None, 0.38, Unlimited),
                PrizeDefinition::new("ext_1h", "1小時續時券", Win, 0.10, Unlimited),
                PrizeDefinition::new("disc_50", "50元折價券", Win, 0.10, Unlimited),
                PrizeDefinition::new("ext_2h", "2小時續時券", Win, 0.034, Limited(30)),
                PrizeDefinition::new("free_2h", "2小時免費包廂卷", Win, 0.005, Limited(15)),
                PrizeDefinition::new("free_4h", "4小時免費包廂卷", Win, 0.001, Limited(5)),
            ],
            fallback_prize_id: DEFAULT_FALLBACK_PRIZE_ID.to_string(),
            branches: vec![
                Branch::new("台北信義店", &["A01", "A02", "A03", "B01", "B02"]),
                Branch::new("新北板橋店", &["101", "102", "103", "VIP"]),
                Branch::new("台中逢甲店", &["R1", "R2", "R3", "R4"]),
                Branch::new("高雄巨蛋店", &["大包廂", "小包廂1", "小包廂2"]),
            ],
            allowed_durations: vec![1, 2, 3, 4, 5, 6, 8, 12],
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.prizes.is_empty() {
            return Err(AppError::ConfigError("Prize table is empty".into()));
        }

        let mut seen = HashSet::new();
        for p in &self.prizes {
            if !seen.insert(p.id.as_str()) {
                return Err(AppError::ConfigError(format!(
                    "Duplicate prize id: {}",
                    p.id
                )));
            }
            if !(0.0..=1.0).contains(&p.probability) {
                return Err(AppError::ConfigError(format!(
                    "Probability of {} out of range: {}",
                    p.id, p.probability
                )));
            }
        }

        let sum: f64 = self.prizes.iter().map(|p| p.probability).sum();
        if (sum - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(AppError::ConfigError(format!(
                "Prize probabilities must sum to 1, got {sum}"
            )));
        }

        if let Some(fallback) = self.prize(&self.fallback_prize_id)
            && (fallback.is_limited() || !fallback.is_win())
        {
            return Err(AppError::ConfigError(format!(
                "Fallback prize {} must be an unlimited WIN prize",
                fallback.id
            )));
        }

        if self.branches.iter().any(|b| b.rooms.is_empty()) {
            return Err(AppError::ConfigError("Every branch needs rooms".into()));
        }

        if self.allowed_durations.is_empty() || self.allowed_durations.contains(&0) {
            return Err(AppError::ConfigError(
                "Allowed durations must be positive".into(),
            ));
        }

        Ok(())
    }

    pub fn prizes(&self) -> &[PrizeDefinition] {
        &self.prizes
    }

    pub fn prize(&self, id: &str) -> Option<&PrizeDefinition> {
        self.prizes.iter().find(|p| p.id == id)
    }

    /// 保底奖品；配置的保底奖品不存在时退回到第一项
    pub fn fallback_prize(&self) -> &PrizeDefinition {
        self.prize(&self.fallback_prize_id)
            .unwrap_or(&self.prizes[0])
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn rooms_of(&self, branch: &str) -> Option<&[String]> {
        self.branches
            .iter()
            .find(|b| b.name == branch)
            .map(|b| b.rooms.as_slice())
    }

    pub fn is_allowed_duration(&self, hours: u32) -> bool {
        self.allowed_durations.contains(&hours)
    }

    pub fn allowed_durations(&self) -> &[u32] {
        &self.allowed_durations
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BranchResponse {
    pub name: String,
    pub rooms: Vec<String>,
}

/// 前端刮刮卡参数（与服务端判定保持一致）
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScratchSettingsResponse {
    pub width: u32,
    pub height: u32,
    pub brush_radius: u32,
    pub sample_stride: u32,
    pub reveal_threshold: f64,
}

impl From<&ScratchConfig> for ScratchSettingsResponse {
    fn from(c: &ScratchConfig) -> Self {
        Self {
            width: c.width,
            height: c.height,
            brush_radius: c.brush_radius,
            sample_stride: c.sample_stride,
            reveal_threshold: c.reveal_threshold,
        }
    }
}

/// 活动目录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub prizes: Vec<PrizeResponse>,
    pub branches: Vec<BranchResponse>,
    pub duration_hours: Vec<u32>,
    pub scratch: ScratchSettingsResponse,
}

impl CatalogResponse {
    pub fn new(catalog: &CampaignCatalog, scratch: &ScratchConfig) -> Self {
        Self {
            prizes: catalog.prizes().iter().map(PrizeResponse::from).collect(),
            branches: catalog
                .branches()
                .iter()
                .map(|b| BranchResponse {
                    name: b.name.clone(),
                    rooms: b.rooms.clone(),
                })
                .collect(),
            duration_hours: catalog.allowed_durations().to_vec(),
            scratch: scratch.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_prizes(p1: f64, p2: f64) -> Vec<PrizeDefinition> {
        vec![
            PrizeDefinition::new("a", "A", PrizeKind::None, p1, InventoryLimit::Unlimited),
            PrizeDefinition::new("b", "B", PrizeKind::Win, p2, InventoryLimit::Unlimited),
        ]
    }

    fn branches() -> Vec<Branch> {
        vec![Branch::new("X", &["1"])]
    }

    #[test]
    fn standard_catalog_is_valid() {
        let catalog = CampaignCatalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.prizes().len(), 7);
        assert_eq!(catalog.prizes()[0].id, "none_1");
        assert_eq!(catalog.fallback_prize().id, "disc_50");
        assert_eq!(
            catalog.prize("free_4h").map(|p| p.inventory_limit),
            Some(InventoryLimit::Limited(5))
        );
    }

    #[test]
    fn rejects_probabilities_not_summing_to_one() {
        let err = CampaignCatalog::new(two_prizes(0.5, 0.4), "b", branches(), vec![1])
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut prizes = two_prizes(0.5, 0.5);
        prizes[1].id = "a".into();
        assert!(CampaignCatalog::new(prizes, "a", branches(), vec![1]).is_err());
    }

    #[test]
    fn rejects_limited_fallback() {
        let mut prizes = two_prizes(0.5, 0.5);
        prizes[1].inventory_limit = InventoryLimit::Limited(3);
        assert!(CampaignCatalog::new(prizes, "b", branches(), vec![1]).is_err());
    }

    #[test]
    fn missing_fallback_uses_first_prize() {
        let catalog =
            CampaignCatalog::new(two_prizes(0.5, 0.5), "gone", branches(), vec![1]).unwrap();
        assert_eq!(catalog.fallback_prize().id, "a");
    }

    #[test]
    fn rooms_depend_on_branch() {
        let catalog = CampaignCatalog::standard();
        let rooms = catalog.rooms_of("台中逢甲店").unwrap();
        assert!(rooms.iter().any(|r| r == "R3"));
        assert!(!rooms.iter().any(|r| r == "VIP"));
        assert!(catalog.rooms_of("不存在").is_none());
        assert!(catalog.is_allowed_duration(8));
        assert!(!catalog.is_allowed_duration(7));
    }
}
