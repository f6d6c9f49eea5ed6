//! Composite limiter keys.

/// Separator between the subject and resource parts of a key.
pub const KEY_SEPARATOR: char = ':';

/// Builds the conventional `"<subject>:<resource>"` key so one limiter can
/// carry an independent quota per subject and resource.
pub fn scoped_key(subject: &str, resource: &str) -> String {
    format!("{subject}{KEY_SEPARATOR}{resource}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_key() {
        assert_eq!(scoped_key("user42", "chat"), "user42:chat");
        assert_eq!(scoped_key("", "health"), ":health");
    }
}
