use rand::Rng;

use crate::utils::generate_six_digit_code;

/// 大奖抽奖资格：消费时长至少 4 小时（固定，不按分店调整）
pub const GRAND_DRAW_MIN_HOURS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrandDrawAssignment {
    pub is_eligible: bool,
    /// 仅在 is_eligible 时存在
    pub serial: Option<String>,
}

/// 资格判定与序号发放
///
/// 序号不与已发放序号比对；按预期活动规模，碰撞概率可忽略。
pub struct GrandDrawAssigner;

impl GrandDrawAssigner {
    pub fn is_eligible(duration_hours: u32) -> bool {
        duration_hours >= GRAND_DRAW_MIN_HOURS
    }

    pub fn assign<R: Rng + ?Sized>(duration_hours: u32, rng: &mut R) -> GrandDrawAssignment {
        if !Self::is_eligible(duration_hours) {
            return GrandDrawAssignment {
                is_eligible: false,
                serial: None,
            };
        }
        GrandDrawAssignment {
            is_eligible: true,
            serial: Some(generate_six_digit_code(rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use regex::Regex;

    #[test]
    fn three_hours_is_not_eligible() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = GrandDrawAssigner::assign(3, &mut rng);
        assert!(!a.is_eligible);
        assert!(a.serial.is_none());
    }

    #[test]
    fn four_hours_gets_six_digit_serial() {
        let re = Regex::new(r"^\d{6}$").unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        for hours in [4, 5, 6, 8, 12] {
            let a = GrandDrawAssigner::assign(hours, &mut rng);
            assert!(a.is_eligible);
            assert!(re.is_match(a.serial.as_deref().unwrap()));
        }
    }
}
