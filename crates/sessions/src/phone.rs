//! Sender phone normalization.

/// Canonical international form of a sender phone number.
///
/// Keeps ASCII digits only, then resolves local forms against the default
/// country code: a leading `0` is replaced by the code, and a bare ten-digit
/// subscriber number gets it prepended. Idempotent over its own output.
#[must_use]
pub fn normalize(raw: &str, country_code: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix('0') {
        return format!("{country_code}{rest}");
    }
    if digits.len() == 10 {
        return format!("{country_code}{digits}");
    }
    digits
}

/// Phone portion of a channel JID (`<phone>@c.us`), normalized.
#[must_use]
pub fn from_jid(jid: &str, country_code: &str) -> String {
    let raw = jid.split('@').next().unwrap_or(jid);
    normalize(raw, country_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CC: &str = "234";

    #[test]
    fn strips_non_digits() {
        assert_eq!(normalize("+234 501-606-5308", CC), "2345016065308");
    }

    #[test]
    fn leading_zero_becomes_country_code() {
        assert_eq!(normalize("05016065308", CC), "2345016065308");
    }

    #[test]
    fn bare_subscriber_number_gets_country_code() {
        assert_eq!(normalize("5016065308", CC), "2345016065308");
    }

    #[test]
    fn equivalent_forms_normalize_identically() {
        let canonical = normalize("2345016065308", CC);
        for raw in ["05016065308", "+2345016065308", "5016065308", "0501 606 5308"] {
            assert_eq!(normalize(raw, CC), canonical, "raw form {raw}");
        }
    }

    #[test]
    fn idempotent_over_own_output() {
        for raw in ["05016065308", "5016065308", "+1 (555) 123-4567", "12345"] {
            let once = normalize(raw, CC);
            assert_eq!(normalize(&once, CC), once, "raw form {raw}");
        }
    }

    #[test]
    fn jid_suffix_is_dropped() {
        assert_eq!(from_jid("2345016065308@c.us", CC), "2345016065308");
        assert_eq!(from_jid("05016065308@c.us", CC), "2345016065308");
    }
}
