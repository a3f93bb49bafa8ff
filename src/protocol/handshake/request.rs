use crate::protocol::{AuthMethod, Encode, SOCKS_VERSION_V5};

/// SOCKS5 method negotiation request
///
/// ```plain
/// +-----+----------+----------+
/// | VER | NMETHODS | METHODS  |
/// +-----+----------+----------+
/// |  1  |    1     | 1 to 255 |
/// +-----+----------+----------|
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    pub methods: Vec<AuthMethod>,
}

impl Request {
    /// Methods are offered in the given order. At most 255 fit into `NMETHODS`.
    pub fn new(methods: Vec<AuthMethod>) -> crate::Result<Self> {
        if methods.is_empty() {
            return Err(crate::Error::NoAuthMethods);
        }
        if methods.len() > u8::MAX as usize {
            return Err(crate::Error::FieldTooLong("method list", methods.len()));
        }
        Ok(Self { methods })
    }
}

impl Encode for Request {
    fn write_to_buf<B: bytes::BufMut>(&self, buf: &mut B) {
        buf.put_u8(SOCKS_VERSION_V5);
        buf.put_u8(self.methods.len() as u8);
        for method in &self.methods {
            buf.put_u8(u8::from(*method));
        }
    }

    fn len(&self) -> usize {
        2 + self.methods.len()
    }
}
