use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

/// 台湾手机号：09 开头共 10 位
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09[0-9]{8}$").expect("mobile pattern is a valid regex"));

/// 验证本地手机号格式
pub fn validate_mobile_phone(phone: &str) -> AppResult<()> {
    if !MOBILE_PATTERN.is_match(phone) {
        return Err(AppError::InvalidInput(
            "手機號碼格式錯誤，須為 09 開頭的 10 位數字".to_string(),
        ));
    }

    Ok(())
}

/// 去除空白与连字符，全形数字转半形，例如 "0912-345-678" -> "0912345678"
///
/// 其他文字的数字不转换，由 [`validate_mobile_phone`] 拒绝。
pub fn normalize_mobile_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '－')
        .map(fold_fullwidth_digit)
        .collect()
}

fn fold_fullwidth_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile_phone() {
        assert!(validate_mobile_phone("0912345678").is_ok());
        assert!(validate_mobile_phone("091234567").is_err());
        assert!(validate_mobile_phone("09123456789").is_err());
        assert!(validate_mobile_phone("0812345678").is_err());
        assert!(validate_mobile_phone("+886912345678").is_err());
        assert!(validate_mobile_phone("09abcdefgh").is_err());
        // 只接受 ASCII 数字
        assert!(validate_mobile_phone("09１２３４５６７８").is_err());
        assert!(validate_mobile_phone("09١٢٣٤٥٦٧٨").is_err());
    }

    #[test]
    fn test_normalize_mobile_phone() {
        assert_eq!(normalize_mobile_phone("0912-345-678"), "0912345678");
        assert_eq!(normalize_mobile_phone(" 0912 345 678 "), "0912345678");
        assert_eq!(normalize_mobile_phone("0912345678"), "0912345678");
        assert_eq!(normalize_mobile_phone("０９１２－３４５－６７８"), "0912345678");
        assert_eq!(normalize_mobile_phone("09١٢٣٤٥٦٧٨"), "09١٢٣٤٥٦٧٨");
    }
}
