use crate::{
    error::{Error, Result},
    protocol::ConnectReply,
};
use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};
use tokio::net::{TcpSocket, TcpStream};

mod auth;
mod config;
pub mod engine;
mod framed;
#[cfg(test)]
pub(crate) mod mock;

pub use self::{
    auth::{Authenticator, NoAuth, UserKeyAuth},
    config::{ClientConfig, DEFAULT_PROXY_PORT, DEFAULT_TIMEOUT, parse_outgoing_interface},
    framed::{BACKOFF, CHUNK_SIZE, Direction, Framed, FramedIo, HARD_TIMEOUT_GRACE, IoTimeouts},
};

/// Progress of a session through the handshake.
///
/// `Failed` is entered from any state when a step fails; only [`Client::close`] or a new
/// [`Client::connect`] leaves it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum State {
    #[default]
    Disconnected,
    TransportOpen,
    MethodNegotiated,
    Authenticated,
    Relayed,
    Failed,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A SOCKS5 client session owning one connection to the proxy.
///
/// ```no_run
/// # use socks5_connector::Result;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<()> {
/// use socks5_connector::{Client, client::NoAuth};
///
/// let mut client = Client::new("127.0.0.1", 1080);
/// client.add_method(NoAuth);
/// client.set_tunnel_dns(true);
/// client.connect().await?;
/// client.connect_to("example.com", 80).await?;
/// client.send(b"GET / HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n").await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    proxy_host: String,
    proxy_port: u16,
    config: ClientConfig,
    methods: Vec<Box<dyn Authenticator>>,
    stream: Option<Framed<TcpStream>>,
    state: State,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let methods: Vec<_> = self.methods.iter().map(|m| m.auth_method()).collect();
        f.debug_struct("Client")
            .field("proxy", &format_args!("{}:{}", self.proxy_host, self.proxy_port))
            .field("config", &self.config)
            .field("methods", &methods)
            .field("state", &self.state)
            .finish()
    }
}

impl Client {
    pub fn new<H: Into<String>>(proxy_host: H, proxy_port: u16) -> Self {
        Self::with_config(proxy_host, proxy_port, ClientConfig::default())
    }

    pub fn with_config<H: Into<String>>(proxy_host: H, proxy_port: u16, config: ClientConfig) -> Self {
        Self {
            proxy_host: proxy_host.into(),
            proxy_port,
            config,
            methods: Vec::new(),
            stream: None,
            state: State::Disconnected,
        }
    }

    /// Registers an authentication method. A method with the same identifier is replaced
    /// in place, so the offer order stays the order of first registration.
    pub fn add_method<A>(&mut self, method: A)
    where
        A: Authenticator + 'static,
    {
        let method: Box<dyn Authenticator> = Box::new(method);
        match self.methods.iter_mut().find(|m| m.auth_method() == method.auth_method()) {
            Some(slot) => *slot = method,
            None => self.methods.push(method),
        }
    }

    /// Binds future proxy connections to the given local IPv4 address.
    pub fn set_outgoing_interface(&mut self, ip: &str) -> Result<()> {
        self.config.outgoing_interface = Some(parse_outgoing_interface(ip)?);
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
        if let Some(stream) = self.stream.as_mut() {
            stream.set_timeouts(IoTimeouts::new(timeout));
        }
    }

    pub fn set_connect_timeout(&mut self, connect_timeout: Duration) {
        self.config.connect_timeout = connect_timeout;
    }

    /// With `true`, destination hostnames are resolved by the proxy instead of locally.
    pub fn set_tunnel_dns(&mut self, tunnel_dns: bool) {
        self.config.tunnel_dns = tunnel_dns;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Opens the connection to the proxy, negotiates a method and authenticates.
    ///
    /// Any previous connection is closed first, which also recovers a failed session.
    pub async fn connect(&mut self) -> Result<()> {
        self.close();
        let result = self.open().await;
        self.settle(result)
    }

    async fn open(&mut self) -> Result<()> {
        let stream = self.open_transport().await?;
        self.stream = Some(Framed::new(stream, IoTimeouts::new(self.config.timeout)));
        self.state = State::TransportOpen;

        let io: &mut dyn FramedIo = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let auth = engine::negotiate(io, &self.methods).await?;
        log::debug!("proxy {}:{} selected method {}", self.proxy_host, self.proxy_port, auth.auth_method());
        self.state = State::MethodNegotiated;

        auth.authenticate(io).await?;
        self.state = State::Authenticated;
        Ok(())
    }

    async fn open_transport(&self) -> Result<TcpStream> {
        let target = format!("{}:{}", self.proxy_host, self.proxy_port);
        let interface = self.config.outgoing_interface;
        let connect = async {
            let mut last_err = None;
            for addr in tokio::net::lookup_host((self.proxy_host.as_str(), self.proxy_port)).await? {
                match dial(addr, interface).await {
                    Ok(stream) => return Ok(stream),
                    Err(e) => last_err = Some(e),
                }
            }
            Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "proxy host has no address")))
        };

        match tokio::time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(stream)) => {
                log::debug!("connected to proxy {target} from {:?}", stream.local_addr().ok());
                Ok(stream)
            }
            Ok(Err(source)) => Err(Error::Transport { addr: target, source }),
            Err(_) => Err(Error::ConnectTimeout(target)),
        }
    }

    /// Asks the proxy to relay to `host:port` and returns the address the proxy bound.
    ///
    /// Afterwards the connection carries application data, see [`Client::send`],
    /// [`Client::recv`] and [`Client::into_inner`].
    pub async fn connect_to(&mut self, host: &str, port: u16) -> Result<SocketAddrV4> {
        self.require(State::Authenticated)?;
        let result = self.relay(host, port).await;
        let reply = self.settle(result)?;
        Ok(reply.address)
    }

    async fn relay(&mut self, host: &str, port: u16) -> Result<ConnectReply> {
        let address = engine::destination(host, port, self.config.tunnel_dns).await?;
        let io: &mut dyn FramedIo = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let reply = engine::request_connect(io, address).await?;
        log::debug!("relay to {host}:{port} established, proxy bound {}", reply.address);
        self.state = State::Relayed;
        Ok(reply)
    }

    pub async fn send(&mut self, buf: &[u8]) -> Result<()> {
        let io = self.live_stream()?;
        let result = io.send(buf).await;
        self.settle(result)
    }

    /// Reads exactly `len` bytes unless the proxy closes the connection first.
    pub async fn recv(&mut self, len: usize) -> Result<Vec<u8>> {
        let io = self.live_stream()?;
        let result = io.recv(len).await;
        self.settle(result)
    }

    /// Drops the proxy connection. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("closing connection to proxy {}:{}", self.proxy_host, self.proxy_port);
            drop(stream);
        }
        self.state = State::Disconnected;
    }

    /// The raw connection, for application traffic once the relay is up.
    pub fn get_mut(&mut self) -> Option<&mut TcpStream> {
        self.stream.as_mut().map(Framed::get_mut)
    }

    /// Hands the raw connection over to the caller.
    pub fn into_inner(mut self) -> Option<TcpStream> {
        self.stream.take().map(Framed::into_inner)
    }

    fn require(&self, expected: State) -> Result<()> {
        if self.stream.is_none() {
            return Err(Error::NotConnected);
        }
        if self.state != expected {
            return Err(Error::InvalidState(self.state));
        }
        Ok(())
    }

    fn live_stream(&mut self) -> Result<&mut Framed<TcpStream>> {
        if self.state == State::Failed {
            return Err(Error::InvalidState(self.state));
        }
        self.stream.as_mut().ok_or(Error::NotConnected)
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log::warn!("session with {}:{} failed in state {}: {e}", self.proxy_host, self.proxy_port, self.state);
            self.state = State::Failed;
        }
        result
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

async fn dial(addr: SocketAddr, interface: Option<Ipv4Addr>) -> io::Result<TcpStream> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    if let Some(ip) = interface {
        if addr.is_ipv6() {
            let err = format!("IPv4 interface {ip} cannot reach {addr}");
            return Err(io::Error::new(io::ErrorKind::AddrNotAvailable, err));
        }
        socket.bind(SocketAddr::from((ip, 0)))?;
    }
    socket.connect(addr).await
}
