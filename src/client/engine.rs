//! The request/reply exchanges of a SOCKS5 session, independent of socket ownership.

use crate::{
    Error, Result,
    client::{Authenticator, FramedIo},
    protocol::{
        Address, AuthMethod, ConnectReply, ConnectRequest, Encode,
        handshake::{HandshakeRequest, HandshakeResponse},
    },
};
use std::net::SocketAddr;

/// Offers every registered method in order and returns the authenticator the proxy picked.
///
/// An empty method list fails before anything is sent.
pub async fn negotiate<'a>(io: &mut dyn FramedIo, methods: &'a [Box<dyn Authenticator>]) -> Result<&'a dyn Authenticator> {
    let req = HandshakeRequest::new(methods.iter().map(|m| m.auth_method()).collect())?;
    io.send(&req.to_bytes()).await?;

    let buf = io.recv(HandshakeResponse::SIZE).await?;
    let resp = HandshakeResponse::try_from(buf.as_slice())?;

    match resp.method {
        AuthMethod::NoAcceptableMethods => Err(Error::NoAcceptableMethods),
        selected => methods
            .iter()
            .find(|m| m.auth_method() == selected)
            .map(|m| &**m)
            .ok_or(Error::MethodUnavailable(selected)),
    }
}

/// Builds the CONNECT destination, resolving `host` locally unless DNS is tunneled.
///
/// Local resolution only accepts IPv4 results.
pub async fn destination(host: &str, port: u16, tunnel_dns: bool) -> Result<Address> {
    if tunnel_dns {
        return Address::domain(host, port);
    }
    let resolved = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        log::debug!("lookup of {host} failed: {e}");
        Error::Resolve(host.to_owned())
    })?;
    resolved
        .filter_map(|addr| match addr {
            SocketAddr::V4(addr) => Some(Address::from(addr)),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| Error::Resolve(host.to_owned()))
}

/// Sends the CONNECT request and validates the fixed-size reply.
pub async fn request_connect(io: &mut dyn FramedIo, address: Address) -> Result<ConnectReply> {
    let req = ConnectRequest::new(address);
    io.send(&req.to_bytes()).await?;

    let buf = io.recv(ConnectReply::SIZE).await?;
    let reply = ConnectReply::try_from(buf.as_slice())?;
    reply.check()?;
    Ok(reply)
}
