use crate::{
    Result,
    client::FramedIo,
    protocol::{AuthMethod, Encode, UserKey, password_method},
};
use async_trait::async_trait;

/// This trait is for defining a client side socks5 authentication method.
///
/// The client offers the methods of every registered authenticator and runs the one
/// the proxy selects. Only the framed I/O capability is handed over, so new methods
/// can be added without touching the negotiation.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use socks5_connector::{Result, client::{Authenticator, FramedIo}, protocol::AuthMethod};
///
/// pub struct Knock;
///
/// #[async_trait]
/// impl Authenticator for Knock {
///     fn auth_method(&self) -> AuthMethod {
///         AuthMethod::from(0x80)
///     }
///
///     async fn authenticate(&self, io: &mut dyn FramedIo) -> Result<()> {
///         io.send(b"knock").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn auth_method(&self) -> AuthMethod;
    async fn authenticate(&self, io: &mut dyn FramedIo) -> Result<()>;
}

/// No authentication as the socks5 handshake method.
#[derive(Debug, Default)]
pub struct NoAuth;

#[async_trait]
impl Authenticator for NoAuth {
    fn auth_method(&self) -> AuthMethod {
        AuthMethod::NoAuth
    }

    async fn authenticate(&self, _: &mut dyn FramedIo) -> Result<()> {
        Ok(())
    }
}

/// Username and password as the socks5 handshake method, RFC 1929.
#[derive(Debug)]
pub struct UserKeyAuth {
    user_key: UserKey,
}

impl UserKeyAuth {
    pub fn new(username: &str, password: &str) -> Self {
        let user_key = UserKey::new(username, password);
        Self { user_key }
    }
}

impl From<UserKey> for UserKeyAuth {
    fn from(user_key: UserKey) -> Self {
        Self { user_key }
    }
}

#[async_trait]
impl Authenticator for UserKeyAuth {
    fn auth_method(&self) -> AuthMethod {
        AuthMethod::UserPass
    }

    async fn authenticate(&self, io: &mut dyn FramedIo) -> Result<()> {
        let req = password_method::Request::new(&self.user_key)?;
        io.send(&req.to_bytes()).await?;

        let buf = io.recv(password_method::Response::SIZE).await?;
        password_method::Response::try_from(buf.as_slice())?.check()?;
        log::debug!("authenticated as {}", self.user_key.username);
        Ok(())
    }
}
