mod address;
mod command;
pub mod handshake;
mod reply;
mod request;
mod response;

pub use self::{
    address::{Address, AddressType},
    command::Command,
    handshake::{
        AuthMethod,
        password_method::{self, UserKey},
    },
    reply::Reply,
    request::ConnectRequest,
    response::ConnectReply,
};
pub use bytes::BufMut;

/// SOCKS protocol version this crate speaks.
pub const SOCKS_VERSION_V5: u8 = 0x05;

/// Reserved byte of requests and replies.
pub const RESERVED: u8 = 0x00;

/// A message that can be serialized into its exact wire representation.
pub trait Encode {
    fn write_to_buf<B: BufMut>(&self, buf: &mut B);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_bytes(&self) -> bytes::BytesMut {
        let mut buf = bytes::BytesMut::with_capacity(self.len());
        self.write_to_buf(&mut buf);
        buf
    }
}

/// Splits a received frame into its fixed-size form, failing on short input.
pub(crate) fn fixed<const N: usize>(data: &[u8]) -> crate::Result<[u8; N]> {
    data.get(..N)
        .and_then(|head| <[u8; N]>::try_from(head).ok())
        .ok_or(crate::Error::ShortReply {
            expected: N,
            received: data.len(),
        })
}
