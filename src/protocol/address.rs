use crate::protocol::Encode;
use bytes::BufMut;
use std::net::{Ipv4Addr, SocketAddrV4};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
#[repr(u8)]
/// ATYP codes a CONNECT request can carry.
pub enum AddressType {
    #[default]
    IPv4 = 0x01,
    Domain = 0x03,
}

impl From<AddressType> for u8 {
    fn from(addr_type: AddressType) -> Self {
        match addr_type {
            AddressType::IPv4 => 0x01,
            AddressType::Domain => 0x03,
        }
    }
}

/// Destination of a CONNECT request.
///
/// ```plain
/// +------+----------+----------+
/// | ATYP | DST.ADDR | DST.PORT |
/// +------+----------+----------+
/// |  1   | Variable |    2     |
/// +------+----------+----------+
/// ```
///
/// A domain is sent as-is when DNS is tunneled through the proxy, otherwise the
/// client resolves it to an IPv4 address first.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Address {
    SocketAddress(SocketAddrV4),
    DomainAddress(String, u16),
}

impl Address {
    /// Builds a domain address, rejecting names that are empty or do not fit the one-byte
    /// length prefix.
    pub fn domain<H: Into<String>>(host: H, port: u16) -> crate::Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(crate::Error::EmptyField("hostname"));
        }
        if host.len() > u8::MAX as usize {
            return Err(crate::Error::FieldTooLong("hostname", host.len()));
        }
        Ok(Address::DomainAddress(host, port))
    }

    pub fn get_type(&self) -> AddressType {
        match self {
            Self::SocketAddress(_) => AddressType::IPv4,
            Self::DomainAddress(_, _) => AddressType::Domain,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Self::SocketAddress(addr) => addr.port(),
            Self::DomainAddress(_, port) => *port,
        }
    }
}

impl Encode for Address {
    fn write_to_buf<B: BufMut>(&self, buf: &mut B) {
        match self {
            Self::SocketAddress(addr) => {
                buf.put_u8(AddressType::IPv4.into());
                buf.put_slice(&addr.ip().octets());
                buf.put_u16(addr.port());
            }
            Self::DomainAddress(addr, port) => {
                let addr = addr.as_bytes();
                buf.put_u8(AddressType::Domain.into());
                buf.put_u8(addr.len() as u8);
                buf.put_slice(addr);
                buf.put_u16(*port);
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Address::SocketAddress(_) => 1 + 4 + 2,
            Address::DomainAddress(addr, _) => 1 + 1 + addr.len() + 2,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::DomainAddress(hostname, port) => write!(f, "{hostname}:{port}"),
            Address::SocketAddress(socket_addr) => write!(f, "{socket_addr}"),
        }
    }
}

impl From<SocketAddrV4> for Address {
    fn from(addr: SocketAddrV4) -> Self {
        Address::SocketAddress(addr)
    }
}

impl From<(Ipv4Addr, u16)> for Address {
    fn from((addr, port): (Ipv4Addr, u16)) -> Self {
        Address::SocketAddress(SocketAddrV4::new(addr, port))
    }
}

#[test]
fn test_address() {
    let addr = Address::from((Ipv4Addr::new(127, 0, 0, 1), 8080));
    assert_eq!(addr.get_type(), AddressType::IPv4);
    assert_eq!(addr.to_bytes().as_ref(), &[0x01, 127, 0, 0, 1, 0x1f, 0x90]);
    assert_eq!(addr.len(), 7);

    let addr = Address::domain("example.com", 8080).unwrap();
    assert_eq!(addr.get_type(), AddressType::Domain);
    assert_eq!(addr.port(), 8080);
    assert_eq!(addr.to_string(), "example.com:8080");
    let mut expected = vec![0x03, 11];
    expected.extend_from_slice(b"example.com");
    expected.extend_from_slice(&[0x1f, 0x90]);
    assert_eq!(addr.to_bytes().as_ref(), expected.as_slice());
    assert_eq!(addr.len(), expected.len());

    assert!(matches!(
        Address::domain("a".repeat(256), 80),
        Err(crate::Error::FieldTooLong("hostname", 256))
    ));
    assert!(Address::domain("a".repeat(255), 80).is_ok());
    assert!(matches!(Address::domain("", 80), Err(crate::Error::EmptyField("hostname"))));
}

#[test]
fn test_address_type() {
    assert_eq!(u8::from(AddressType::IPv4), 0x01);
    assert_eq!(u8::from(AddressType::Domain), 0x03);
    assert_eq!(AddressType::default(), AddressType::IPv4);
}
