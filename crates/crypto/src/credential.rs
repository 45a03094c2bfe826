//! Parsed contents of a decrypted store entry.

use std::fmt;

use zeroize::Zeroizing;

use crate::CryptoError;

/// Line keys that carry the username, compared case-insensitively.
const USERNAME_KEYS: [&str; 3] = ["login", "username", "user"];

/// Password plus optional username. Both are scrubbed on drop.
pub struct DecryptedCredential {
    password: Zeroizing<String>,
    username: Option<Zeroizing<String>>,
}

impl DecryptedCredential {
    pub fn new(password: impl Into<String>, username: Option<String>) -> Self {
        Self {
            password: Zeroizing::new(password.into()),
            username: username.map(Zeroizing::new),
        }
    }

    /// Parse a decrypted payload.
    ///
    /// ```text
    /// hunter2              <- first line: password
    /// login: alice         <- first login/username/user line: username
    /// url: example.com
    /// ```
    pub fn parse(plaintext: &[u8]) -> Result<Self, CryptoError> {
        let text = std::str::from_utf8(plaintext)
            .map_err(|e| CryptoError::SecretDecode(format!("not UTF-8 at byte {}", e.valid_up_to())))?;

        let mut lines = text.lines();
        let password = lines
            .next()
            .ok_or_else(|| CryptoError::SecretDecode("empty entry".to_string()))?;

        let username = lines.find_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            (USERNAME_KEYS.contains(&key.as_str()) && !value.is_empty()).then(|| value.to_string())
        });

        Ok(Self::new(password, username))
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().map(String::as_str)
    }
}

impl fmt::Debug for DecryptedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedCredential")
            .field("password", &"<redacted>")
            .field("has_username", &self.username.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_only() {
        let cred = DecryptedCredential::parse(b"hunter2\n").unwrap();
        assert_eq!(cred.password(), "hunter2");
        assert_eq!(cred.username(), None);
    }

    #[test]
    fn test_username_keys() {
        for payload in [
            "pw\nlogin: alice",
            "pw\nUsername:alice  ",
            "pw\nurl: example.com\nUSER: alice\nlogin: bob",
        ] {
            let cred = DecryptedCredential::parse(payload.as_bytes()).unwrap();
            assert_eq!(cred.username(), Some("alice"), "payload {payload:?}");
        }
    }

    #[test]
    fn test_first_line_is_never_username() {
        let cred = DecryptedCredential::parse(b"login: secret\nuser: alice").unwrap();
        assert_eq!(cred.password(), "login: secret");
        assert_eq!(cred.username(), Some("alice"));
    }

    #[test]
    fn test_crlf_payload() {
        let cred = DecryptedCredential::parse(b"pw\r\nlogin: alice\r\n").unwrap();
        assert_eq!(cred.password(), "pw");
        assert_eq!(cred.username(), Some("alice"));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            DecryptedCredential::parse(&[0xff, 0xfe]),
            Err(CryptoError::SecretDecode(_))
        ));
        assert!(matches!(
            DecryptedCredential::parse(b""),
            Err(CryptoError::SecretDecode(_))
        ));
    }

    #[test]
    fn test_debug_redacts() {
        let cred = DecryptedCredential::new("hunter2", Some("alice".into()));
        let shown = format!("{cred:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("alice"));
    }
}
