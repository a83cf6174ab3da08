//! MAC address normalization for the wake command.

/// Normalize a MAC address to uppercase colon-separated form.
///
/// Accepts `:` or `-` separators or a bare 12-digit hex string.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect::<String>()
        .to_uppercase();

    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let pairs: Vec<&str> = (0..6).map(|i| &digits[i * 2..i * 2 + 2]).collect();
    Some(pairs.join(":"))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_separators_and_bare_hex() {
        for input in ["aa:bb:cc:dd:ee:ff", "AA-BB-CC-DD-EE-FF", "aabbccddeeff"] {
            assert_eq!(normalize_mac(input).as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        }
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!(normalize_mac("aa:bb:cc:dd:ee").is_none());
        assert!(normalize_mac("aa:bb:cc:dd:ee:ff:00").is_none());
        assert!(normalize_mac("zz:bb:cc:dd:ee:ff").is_none());
        assert!(normalize_mac("").is_none());
    }
}
