/// Format a 10-digit phone number as `(XXX) XXX-XXXX` / 格式化电话号码
/// Other lengths are returned as plain digits / 非10位原样返回
pub fn format_phone_number(phone_number: i64) -> String {
    let digits = phone_number.to_string();
    if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits;
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Escape LIKE wildcards so user text matches literally / 转义LIKE通配符
/// Use together with `ESCAPE '\'`.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case folding shared by in-memory matching and the store's `*_lower` columns / 统一大小写折叠
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Build a `%text%` LIKE pattern / 构建包含匹配模式
pub fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape_like(text))
}
