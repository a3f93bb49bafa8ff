use crate::protocol::{Address, Command, Encode, RESERVED, SOCKS_VERSION_V5};

/// SOCKS5 CONNECT request
///
/// ```plain
/// +-----+-----+-------+------+----------+----------+
/// | VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +-----+-----+-------+------+----------+----------+
/// |  1  |  1  | X'00' |  1   | Variable |    2     |
/// +-----+-----+-------+------+----------+----------+
/// ```
#[derive(Clone, Debug)]
pub struct ConnectRequest {
    pub command: Command,
    pub address: Address,
}

impl ConnectRequest {
    pub fn new(address: Address) -> Self {
        Self {
            command: Command::Connect,
            address,
        }
    }
}

impl Encode for ConnectRequest {
    fn write_to_buf<B: bytes::BufMut>(&self, buf: &mut B) {
        buf.put_u8(SOCKS_VERSION_V5);
        buf.put_u8(u8::from(self.command));
        buf.put_u8(RESERVED);
        self.address.write_to_buf(buf);
    }

    fn len(&self) -> usize {
        3 + self.address.len()
    }
}
