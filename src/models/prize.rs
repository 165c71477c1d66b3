use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖品类型：NONE = 未中奖，WIN = 中奖
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PrizeKind {
    #[sea_orm(string_value = "NONE")]
    None,
    #[sea_orm(string_value = "WIN")]
    Win,
}

/// 奖品库存上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryLimit {
    Unlimited,
    Limited(u32),
}

impl InventoryLimit {
    pub fn as_option(self) -> Option<u32> {
        match self {
            InventoryLimit::Unlimited => None,
            InventoryLimit::Limited(n) => Some(n),
        }
    }
}

/// 奖品定义（启动时加载，之后不可变）
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeDefinition {
    pub id: String,
    pub name: String,
    pub kind: PrizeKind,
    /// 概率 [0, 1]，所有奖品之和为 1
    pub probability: f64,
    pub inventory_limit: InventoryLimit,
}

impl PrizeDefinition {
    pub fn new(
        id: &str,
        name: &str,
        kind: PrizeKind,
        probability: f64,
        inventory_limit: InventoryLimit,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            probability,
            inventory_limit,
        }
    }

    /// 是否是限量奖品
    pub fn is_limited(&self) -> bool {
        matches!(self.inventory_limit, InventoryLimit::Limited(_))
    }

    pub fn is_win(&self) -> bool {
        self.kind == PrizeKind::Win
    }
}

/// 抽中后返回给用户的奖品快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignedPrize {
    pub id: String,
    pub name: String,
    pub kind: PrizeKind,
}

impl From<&PrizeDefinition> for AssignedPrize {
    fn from(p: &PrizeDefinition) -> Self {
        AssignedPrize {
            id: p.id.clone(),
            name: p.name.clone(),
            kind: p.kind,
        }
    }
}

/// 奖品展示信息
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrizeResponse {
    pub id: String,
    pub name: String,
    pub kind: PrizeKind,
    pub probability: f64,
    /// None = 无限
    pub inventory_limit: Option<u32>,
}

impl From<&PrizeDefinition> for PrizeResponse {
    fn from(p: &PrizeDefinition) -> Self {
        PrizeResponse {
            id: p.id.clone(),
            name: p.name.clone(),
            kind: p.kind,
            probability: p.probability,
            inventory_limit: p.inventory_limit.as_option(),
        }
    }
}

/// 限量奖品已发放统计
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrizeCountResponse {
    pub prize_id: String,
    pub prize_name: String,
    pub awarded: u32,
    pub limit: u32,
}
