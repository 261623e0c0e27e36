// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use std::str::FromStr;

/// Number of characters in an issued guest token
pub const GUEST_TOKEN_LENGTH: usize = 64;

crate::diesel_newtype! {
    GuestToken(String) => diesel::sql_types::Text
}

impl GuestToken {
    /// Generate a random guest token
    #[cfg(feature = "rand")]
    pub fn generate() -> Self {
        use rand::Rng;

        let token = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(GUEST_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        Self::from(token)
    }

    /// Get a str reference to the data in the guest token
    pub fn as_str(&self) -> &str {
        self.inner()
    }
}

/// Error returned when a string cannot possibly be an issued guest token
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed guest token")]
pub struct MalformedGuestToken;

impl FromStr for GuestToken {
    type Err = MalformedGuestToken;

    /// Only checks the shape of the token, not whether it was ever issued.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == GUEST_TOKEN_LENGTH && s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self::from(s.to_owned()))
        } else {
            Err(MalformedGuestToken)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(GuestToken::from_str(""), Err(MalformedGuestToken));
        assert_eq!(GuestToken::from_str("abc"), Err(MalformedGuestToken));
        assert_eq!(
            GuestToken::from_str(&"a".repeat(GUEST_TOKEN_LENGTH + 1)),
            Err(MalformedGuestToken)
        );
        assert_eq!(
            GuestToken::from_str(&format!("{}-", "a".repeat(GUEST_TOKEN_LENGTH - 1))),
            Err(MalformedGuestToken)
        );
    }

    #[test]
    fn parse_accepts_well_formed() {
        let raw = "aB3".repeat(21) + "x";
        let token = GuestToken::from_str(&raw).unwrap();
        assert_eq!(token.as_str(), raw);
    }

    #[cfg(feature = "rand")]
    #[test]
    fn generated_tokens_are_well_formed() {
        let token = GuestToken::generate();
        assert_eq!(token.as_str().len(), GUEST_TOKEN_LENGTH);
        assert!(GuestToken::from_str(token.as_str()).is_ok());
        assert_ne!(token, GuestToken::generate());
    }
}
