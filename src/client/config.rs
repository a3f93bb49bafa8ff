use crate::{Error, Result};
use std::{net::Ipv4Addr, time::Duration};

/// Port a SOCKS proxy listens on unless told otherwise.
pub const DEFAULT_PROXY_PORT: u16 = 1080;

/// Default for both the I/O and the connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Session settings, fixed before [`Client::connect`](crate::Client::connect).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Soft timeout of each read/write attempt. The hard deadline of a whole
    /// `send`/`recv` is this plus two seconds.
    pub timeout: Duration,
    /// Upper bound for opening the TCP connection to the proxy.
    pub connect_timeout: Duration,
    /// Let the proxy resolve destination hostnames.
    pub tunnel_dns: bool,
    /// Local address the proxy connection is bound to.
    pub outgoing_interface: Option<Ipv4Addr>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_TIMEOUT,
            tunnel_dns: false,
            outgoing_interface: None,
        }
    }
}

/// Parses a dotted IPv4 address usable as a source address.
///
/// The reserved blocks 0.0.0.0/8, 127.0.0.0/8, 169.254.0.0/16 and 240.0.0.0/4 are refused.
pub fn parse_outgoing_interface(ip: &str) -> Result<Ipv4Addr> {
    let addr: Ipv4Addr = ip.parse().map_err(|_| Error::InvalidInterface(ip.to_owned()))?;
    let [first, second, ..] = addr.octets();
    let reserved = first == 0 || first == 127 || first >= 240 || (first == 169 && second == 254);
    if reserved {
        return Err(Error::InvalidInterface(ip.to_owned()));
    }
    Ok(addr)
}
