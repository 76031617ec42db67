/// Fixed special-character set accepted by the password policy.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/";

/// Validate a proposed plaintext password against the registration rules.
///
/// Rules are evaluated in a fixed order and all must pass; the returned
/// violations preserve that order so callers can surface the first one.
/// Applied at registration only, never at login or reset.
pub fn validate(plain: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if plain.chars().count() <= 8 {
        violations.push("Password must be more than 8 characters");
    }
    if !plain.chars().any(|c| c.is_lowercase()) {
        violations.push("Password must contain at least one lowercase letter");
    }
    if !plain.chars().any(|c| c.is_uppercase()) {
        violations.push("Password must contain at least one uppercase letter");
    }
    if !plain.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        violations.push("Password must contain at least one special character");
    }

    violations
}

/// First failing rule, if any. This is what registration reports back.
pub fn first_violation(plain: &str) -> Option<&'static str> {
    validate(plain).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_chars_fails_length_rule_first() {
        // 8 chars exactly: length must be strictly greater than 8.
        let violations = validate("short1A!");
        assert_eq!(
            violations.first().copied(),
            Some("Password must be more than 8 characters")
        );
    }

    #[test]
    fn nine_chars_with_all_classes_passes() {
        assert!(validate("longer1A!").is_empty());
        assert_eq!(first_violation("longer1A!"), None);
    }

    #[test]
    fn missing_lowercase_reported() {
        assert_eq!(
            first_violation("LONGERRR1!"),
            Some("Password must contain at least one lowercase letter")
        );
    }

    #[test]
    fn missing_uppercase_reported() {
        assert_eq!(
            first_violation("longerrr1!"),
            Some("Password must contain at least one uppercase letter")
        );
    }

    #[test]
    fn missing_special_reported() {
        assert_eq!(
            first_violation("longerrr1A"),
            Some("Password must contain at least one special character")
        );
    }

    #[test]
    fn rules_report_in_declaration_order() {
        // Too short and all-lowercase: length rule comes first.
        let violations = validate("abc");
        assert_eq!(violations[0], "Password must be more than 8 characters");
        assert!(violations.contains(&"Password must contain at least one uppercase letter"));
        assert!(violations.contains(&"Password must contain at least one special character"));
    }

    #[test]
    fn every_listed_special_character_satisfies_the_rule() {
        for c in SPECIAL_CHARACTERS.chars() {
            let candidate = format!("longPass1A{c}");
            assert!(
                validate(&candidate).is_empty(),
                "special char {c:?} should satisfy the policy"
            );
        }
    }
}
