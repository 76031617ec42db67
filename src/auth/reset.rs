use rand::{distributions::Alphanumeric, Rng};
use time::{Duration, OffsetDateTime};

/// Reset tokens are opaque random strings, not signed structures. 48
/// alphanumeric characters gives ~285 bits of entropy.
const TOKEN_LEN: usize = 48;

/// Window during which a stored reset token is honoured.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Expiry paired with a freshly issued token.
pub fn reset_token_expiry() -> OffsetDateTime {
    OffsetDateTime::now_utc() + RESET_TOKEN_TTL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_has_expected_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn expiry_is_one_hour_out() {
        let now = OffsetDateTime::now_utc();
        let expiry = reset_token_expiry();
        let delta = expiry - now;
        assert!(delta > Duration::minutes(59));
        assert!(delta <= Duration::minutes(61));
    }
}
