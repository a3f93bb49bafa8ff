use crate::{
    Error, Result,
    protocol::{Reply, SOCKS_VERSION_V5, fixed},
};
use std::net::{Ipv4Addr, SocketAddrV4};

/// SOCKS5 CONNECT reply, decoded in its IPv4 shape
///
/// ```plain
/// +-----+-----+-------+------+----------+----------+
/// | VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +-----+-----+-------+------+----------+----------+
/// |  1  |  1  | X'00' |  1   |    4     |    2     |
/// +-----+-----+-------+------+----------+----------+
/// ```
///
/// The address type byte is recorded but not interpreted: the bound address is always
/// read as four bytes, so domain or IPv6 replies are not supported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectReply {
    pub version: u8,
    pub reply: Reply,
    pub reserved: u8,
    pub address_type: u8,
    pub address: SocketAddrV4,
}

impl ConnectReply {
    pub const SIZE: usize = 10;

    /// Fails unless the version is 5 and the proxy reported success.
    pub fn check(&self) -> Result<()> {
        if self.version != SOCKS_VERSION_V5 {
            return Err(Error::InvalidVersion(self.version));
        }
        if !self.reply.is_success() {
            return Err(Error::Rejected(self.reply));
        }
        Ok(())
    }
}

impl TryFrom<&[u8]> for ConnectReply {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        let buf = fixed::<{ ConnectReply::SIZE }>(data)?;
        let ip = Ipv4Addr::new(buf[4], buf[5], buf[6], buf[7]);
        let port = u16::from_be_bytes([buf[8], buf[9]]);
        Ok(Self {
            version: buf[0],
            reply: Reply::from(buf[1]),
            reserved: buf[2],
            address_type: buf[3],
            address: SocketAddrV4::new(ip, port),
        })
    }
}
