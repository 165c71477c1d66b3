use rand::Rng;

/// 生成6位数字序号（抽奖券号），范围 100000..=999999
pub fn generate_six_digit_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:06}", rng.gen_range(100000..=999999))
}
