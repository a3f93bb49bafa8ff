/// Authentication method identifier as assigned by IANA.
///
/// See <https://www.iana.org/assignments/socks-methods/socks-methods.xhtml>.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub enum AuthMethod {
    /// No authentication required.
    #[default]
    NoAuth,
    /// GSS API. Listed for completeness, no authenticator is shipped for it.
    GssApi,
    /// Username/password, RFC 1929.
    UserPass,
    /// IANA assigned or reserved 0x03..=0x7f.
    IanaReserved(u8),
    /// A private authentication method 0x80..=0xfe.
    Private(u8),
    /// X'FF' NO ACCEPTABLE METHODS, only ever sent by the server.
    NoAcceptableMethods,
}

impl From<u8> for AuthMethod {
    fn from(value: u8) -> Self {
        match value {
            0x00 => AuthMethod::NoAuth,
            0x01 => AuthMethod::GssApi,
            0x02 => AuthMethod::UserPass,
            0x03..=0x7f => AuthMethod::IanaReserved(value),
            0x80..=0xfe => AuthMethod::Private(value),
            0xff => AuthMethod::NoAcceptableMethods,
        }
    }
}

impl From<AuthMethod> for u8 {
    fn from(value: AuthMethod) -> Self {
        match value {
            AuthMethod::NoAuth => 0x00,
            AuthMethod::GssApi => 0x01,
            AuthMethod::UserPass => 0x02,
            AuthMethod::IanaReserved(value) | AuthMethod::Private(value) => value,
            AuthMethod::NoAcceptableMethods => 0xff,
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AuthMethod::NoAuth => write!(f, "NoAuth"),
            AuthMethod::GssApi => write!(f, "GssApi"),
            AuthMethod::UserPass => write!(f, "UserPass"),
            AuthMethod::IanaReserved(value) => write!(f, "IanaReserved({value:#04x})"),
            AuthMethod::Private(value) => write!(f, "Private({value:#04x})"),
            AuthMethod::NoAcceptableMethods => write!(f, "NoAcceptableMethods"),
        }
    }
}

#[test]
fn auth_method_codes() {
    for code in 0..=u8::MAX {
        assert_eq!(u8::from(AuthMethod::from(code)), code);
    }
    assert_eq!(AuthMethod::from(0x02), AuthMethod::UserPass);
    assert_eq!(AuthMethod::from(0x80), AuthMethod::Private(0x80));
    assert_eq!(AuthMethod::from(0x09).to_string(), "IanaReserved(0x09)");
}
