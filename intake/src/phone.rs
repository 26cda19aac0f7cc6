//! Russian mobile number pattern and the `+7 (XXX) XXX-XX-XX` input mask.

use regex::Regex;
use std::sync::LazyLock;

/// `+7` or `8`, optional separators, then ten digits.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+7|8)[\s\-]?\(?\d{3}\)?[\s\-]?\d{3}[\s\-]?\d{2}[\s\-]?\d{2}$")
        .expect("phone pattern is valid")
});

const NATIONAL_DIGITS: usize = 10;

pub fn is_russian_mobile(value: &str) -> bool {
    PHONE_PATTERN.is_match(value.trim())
}

/// Reformats whatever was typed into the masked display form.
///
/// A leading `7` or `8` is read as the country prefix. At most ten national
/// digits are kept, so the result never grows past the mask. Applying the
/// mask to its own output returns it unchanged.
pub fn apply_mask(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return String::new();
    }

    let national = match digits[0] {
        '7' | '8' => &digits[1..],
        _ => &digits[..],
    };
    let national = &national[..national.len().min(NATIONAL_DIGITS)];

    let mut masked = String::from("+7");
    for (i, digit) in national.iter().enumerate() {
        match i {
            0 => masked.push_str(" ("),
            3 => masked.push_str(") "),
            6 | 8 => masked.push('-'),
            _ => {}
        }
        masked.push(*digit);
    }
    masked
}

/// Length of a fully filled mask, `+7 (999) 123-45-67`.
pub const MASK_LEN: usize = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        for number in [
            "+79991234567",
            "89991234567",
            "+7 (999) 123-45-67",
            "8 (999) 123-45-67",
            "8-999-123-45-67",
        ] {
            assert!(is_russian_mobile(number), "{number} should be valid");
        }
    }

    #[test]
    fn test_invalid_numbers() {
        for number in ["12345", "", "abcdef", "+7999123456", "+799912345678", "+1 (999) 123-45-67"] {
            assert!(!is_russian_mobile(number), "{number} should be invalid");
        }
    }

    #[test]
    fn test_mask_full_number() {
        assert_eq!(apply_mask("89991234567"), "+7 (999) 123-45-67");
        assert_eq!(apply_mask("+79991234567"), "+7 (999) 123-45-67");
        assert_eq!(apply_mask("9991234567"), "+7 (999) 123-45-67");
        assert_eq!(apply_mask("+7 (999) 123-45-67").len(), MASK_LEN);
    }

    #[test]
    fn test_mask_progressive() {
        assert_eq!(apply_mask(""), "");
        assert_eq!(apply_mask("abc"), "");
        assert_eq!(apply_mask("8"), "+7");
        assert_eq!(apply_mask("9"), "+7 (9");
        assert_eq!(apply_mask("+7 (999"), "+7 (999");
        assert_eq!(apply_mask("+7 (9991"), "+7 (999) 1");
        assert_eq!(apply_mask("+7 (999) 1234"), "+7 (999) 123-4");
        assert_eq!(apply_mask("+7 (999) 123-456"), "+7 (999) 123-45-6");
    }

    #[test]
    fn test_mask_is_idempotent() {
        for input in ["8", "9", "+7 (99", "89991234", "+79991234567", "8 (999) 123-45-67"] {
            let once = apply_mask(input);
            assert_eq!(apply_mask(&once), once, "mask of {input:?} not stable");
        }
    }

    #[test]
    fn test_mask_never_exceeds_length() {
        let masked = apply_mask("+7 (999) 123-45-6789999");
        assert_eq!(masked, "+7 (999) 123-45-67");
        assert!(masked.len() <= MASK_LEN);
    }

    #[test]
    fn test_masked_output_passes_validation() {
        assert!(is_russian_mobile(&apply_mask("89991234567")));
        assert!(!is_russian_mobile(&apply_mask("8999123")));
    }
}
