mod request;
mod response;

pub use self::{request::Request, response::Response};

pub const SUBNEGOTIATION_VERSION: u8 = 0x01;

/// Credentials for username/password authentication.
#[derive(Default, Eq, PartialEq, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct UserKey {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKey")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl UserKey {
    /// Constructs `UserKey` with the specified username and a password.
    pub fn new<U, P>(username: U, password: P) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields carry a one-byte length prefix on the wire.
    pub fn validate(&self) -> crate::Result<()> {
        if self.username.len() > u8::MAX as usize {
            return Err(crate::Error::FieldTooLong("username", self.username.len()));
        }
        if self.password.len() > u8::MAX as usize {
            return Err(crate::Error::FieldTooLong("password", self.password.len()));
        }
        Ok(())
    }
}

#[test]
fn user_key_hides_password() {
    let key = UserKey::new("hyper", "proxy");
    let dbg = format!("{key:?}");
    assert!(dbg.contains("hyper"));
    assert!(!dbg.contains("proxy"));
    assert!(key.validate().is_ok());
    assert!(matches!(
        UserKey::new("u", "p".repeat(300)).validate(),
        Err(crate::Error::FieldTooLong("password", 300))
    ));
}
