/// Format a Thai phone number for display.
/// Mobile numbers (10 digits starting with 0) become 0XX-XXX-XXXX;
/// anything else is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 10 && digits.starts_with('0') {
        format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
    } else {
        phone.to_string()
    }
}

/// Truncate a string to a maximum number of characters, adding an
/// ellipsis if needed. Counts chars, not bytes - names and addresses
/// here are mostly Thai.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else if max_chars <= 1 {
        s.chars().take(max_chars).collect()
    } else {
        let kept: String = s.chars().take(max_chars - 1).collect();
        format!("{}…", kept)
    }
}

/// Format an optional string, returning a default if None or empty
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Format an optional timestamp as a short date for table cells
pub fn format_date(date: &Option<chrono::DateTime<chrono::Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => "-".to_string(),
    }
}

/// Case-insensitive substring check (ASCII fold; Thai has no case)
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("0812345678"), "081-234-5678");
        assert_eq!(format_phone("081-234-5678"), "081-234-5678");
        assert_eq!(format_phone("042123456"), "042123456"); // 9-digit landline, as-is
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("สมชาย ใจดี", 20), "สมชาย ใจดี");
        assert_eq!(truncate("สมชาย ใจดี", 6), "สมชาย…");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("EMS123456789TH", "ems123"));
        assert!(contains_ignore_case("สมชาย ใจดี", "สมชาย"));
        assert!(!contains_ignore_case("สมชาย", "สมหญิง"));
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("x".to_string()), "-"), "x");
        assert_eq!(format_optional(&Some(String::new()), "-"), "-");
        assert_eq!(format_optional(&None, "-"), "-");
    }
}
