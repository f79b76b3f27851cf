use regex::Regex;

/// Indian mobile numbers: exactly 10 digits, first digit 6-9.
pub fn validate_mobile(mobile: &str) -> bool {
    let re = Regex::new(r"^[6-9]\d{9}$").unwrap();
    re.is_match(mobile)
}

/// Permissive syntactic check; the delivery provider is the source of truth.
pub fn validate_email(email: &str) -> bool {
    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    re.is_match(email)
}

pub fn validate_otp_code(code: &str) -> bool {
    let re = Regex::new(r"^\d{6}$").unwrap();
    re.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_accepts_ten_digits_starting_six_to_nine() {
        assert!(validate_mobile("9876543210"));
        assert!(validate_mobile("6000000000"));
        assert!(validate_mobile("7123456789"));
    }

    #[test]
    fn mobile_rejects_bad_prefix_length_and_symbols() {
        assert!(!validate_mobile("5876543210"));
        assert!(!validate_mobile("98765432"));
        assert!(!validate_mobile("98765432101"));
        assert!(!validate_mobile("98765-4321"));
        assert!(!validate_mobile(""));
    }

    #[test]
    fn email_accepts_anything_with_at_and_dot() {
        assert!(validate_email("a@b.co"));
        assert!(validate_email("jane.doe+tag@example.org"));
    }

    #[test]
    fn email_rejects_missing_dot_or_spaces() {
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.com"));
        assert!(!validate_email("plainaddress"));
        assert!(!validate_email("@no-local.com"));
    }

    #[test]
    fn otp_code_is_exactly_six_digits() {
        assert!(validate_otp_code("123456"));
        assert!(!validate_otp_code("12345"));
        assert!(!validate_otp_code("1234567"));
        assert!(!validate_otp_code("12a456"));
    }
}
