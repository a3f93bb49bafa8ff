use crate::protocol::{Encode, UserKey};

/// SOCKS5 password handshake request
///
/// ```plain
/// +-----+------+----------+------+----------+
/// | VER | ULEN |  UNAME   | PLEN |  PASSWD  |
/// +-----+------+----------+------+----------+
/// |  1  |  1   | 1 to 255 |  1   | 1 to 255 |
/// +-----+------+----------+------+----------+
/// ```
#[derive(Clone, Debug)]
pub struct Request<'a> {
    pub user_key: &'a UserKey,
}

impl<'a> Request<'a> {
    pub fn new(user_key: &'a UserKey) -> crate::Result<Self> {
        user_key.validate()?;
        Ok(Self { user_key })
    }
}

impl Encode for Request<'_> {
    fn write_to_buf<B: bytes::BufMut>(&self, buf: &mut B) {
        buf.put_u8(super::SUBNEGOTIATION_VERSION);

        let username = self.user_key.username.as_bytes();
        buf.put_u8(username.len() as u8);
        buf.put_slice(username);

        let password = self.user_key.password.as_bytes();
        buf.put_u8(password.len() as u8);
        buf.put_slice(password);
    }

    fn len(&self) -> usize {
        3 + self.user_key.username.len() + self.user_key.password.len()
    }
}

#[test]
fn password_request_layout() {
    let key = UserKey::new("bob", "hunter2");
    let req = Request::new(&key).unwrap();
    let mut expected = vec![0x01, 3];
    expected.extend_from_slice(b"bob");
    expected.push(7);
    expected.extend_from_slice(b"hunter2");
    assert_eq!(req.to_bytes().as_ref(), expected.as_slice());
    assert_eq!(req.len(), expected.len());
}
