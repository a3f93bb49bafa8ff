use crate::{Error, Result, protocol::fixed};

/// SOCKS5 password handshake response
///
/// ```plain
/// +-----+--------+
/// | VER | STATUS |
/// +-----+--------+
/// |  1  |   1    |
/// +-----+--------+
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u8,
}

impl Response {
    pub const SIZE: usize = 2;
    const STATUS_SUCCEEDED: u8 = 0x00;

    /// Any status other than 0x00 means the proxy refused the credentials.
    pub fn check(&self) -> Result<()> {
        match self.status {
            Self::STATUS_SUCCEEDED => Ok(()),
            code => Err(Error::InvalidAuthStatus(code)),
        }
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        let [ver, status]: [u8; Response::SIZE] = fixed(data)?;
        if ver != super::SUBNEGOTIATION_VERSION {
            return Err(Error::InvalidAuthSubnegotiation(ver));
        }
        Ok(Self { status })
    }
}
