//! Per-invocation correlation tokens

use std::fmt;

/// Random token identifying a single invocation
///
/// Passed to the launched context so it can namespace temp files and
/// similar per-run state. Rendered as unpadded lower-case hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextToken(u32);

impl ContextToken {
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rendering() {
        assert_eq!(ContextToken::from_raw(0).to_string(), "0");
        assert_eq!(ContextToken::from_raw(0x0abc).to_string(), "abc");
        assert_eq!(ContextToken::from_raw(u32::MAX).to_string(), "ffffffff");
    }

    #[test]
    fn test_generated_token_is_hex() {
        let token = ContextToken::generate().to_string();
        assert!(!token.is_empty());
        assert!(token.len() <= 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
