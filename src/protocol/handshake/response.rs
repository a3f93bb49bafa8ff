use crate::{
    Error, Result,
    protocol::{AuthMethod, SOCKS_VERSION_V5, fixed},
};

/// SOCKS5 method negotiation reply
///
/// ```plain
/// +-----+--------+
/// | VER | METHOD |
/// +-----+--------+
/// |  1  |   1    |
/// +-----+--------+
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub method: AuthMethod,
}

impl Response {
    pub const SIZE: usize = 2;
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        let [ver, method]: [u8; Response::SIZE] = fixed(data)?;
        if ver != SOCKS_VERSION_V5 {
            return Err(Error::InvalidVersion(ver));
        }
        Ok(Self {
            method: AuthMethod::from(method),
        })
    }
}
