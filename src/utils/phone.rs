/// Normalizes a phone number into the canonical country-coded digit
/// string used as the login key in the employee sheet. Local numbers
/// ("0XXXXXXXXX") gain the 38 country prefix; anything else keeps its
/// digits as-is.
pub fn sanitize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.len() == 10 && digits.starts_with('0') {
        return Some(format!("38{digits}"));
    }
    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_number_gets_country_code() {
        assert_eq!(sanitize_phone("0501234567").as_deref(), Some("380501234567"));
    }

    #[test]
    fn test_country_coded_numbers_unchanged() {
        assert_eq!(sanitize_phone("+380501234567").as_deref(), Some("380501234567"));
        assert_eq!(sanitize_phone("380501234567").as_deref(), Some("380501234567"));
    }

    #[test]
    fn test_non_digits_stripped_first() {
        assert_eq!(sanitize_phone("(050) 123-45-67").as_deref(), Some("380501234567"));
        assert_eq!(sanitize_phone("a0b50c1234567").as_deref(), Some("380501234567"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_phone(""), None);
        assert_eq!(sanitize_phone("---"), None);
    }
}
