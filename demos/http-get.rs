use socks5_connector::{
    Client, ClientConfig, Result,
    client::{DEFAULT_PROXY_PORT, NoAuth, UserKeyAuth},
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Fetch an HTTP resource through a socks5 proxy.
#[derive(clap::Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Fetch an HTTP resource through a socks5 proxy.", long_about = None)]
pub struct CmdOpt {
    /// Socks5 proxy host.
    #[clap(long, value_name = "host", default_value = "127.0.0.1")]
    proxy: String,

    /// Socks5 proxy port.
    #[clap(long, value_name = "port", default_value_t = DEFAULT_PROXY_PORT)]
    proxy_port: u16,

    /// Destination host.
    #[clap(long, value_name = "host", default_value = "example.com")]
    host: String,

    /// Destination port.
    #[clap(long, value_name = "port", default_value = "80")]
    port: u16,

    /// Username for socks5 authentication.
    #[clap(short, long, value_name = "username")]
    username: Option<String>,

    /// Password for socks5 authentication.
    #[clap(short, long, value_name = "password")]
    password: Option<String>,

    /// Let the proxy resolve the destination host.
    #[clap(long)]
    tunnel_dns: bool,

    /// Local IPv4 address to connect from.
    #[clap(long, value_name = "ip")]
    bind: Option<String>,

    /// I/O and connect timeout.
    #[clap(short, long, value_name = "seconds", default_value = "10")]
    timeout: u64,

    /// Verbosity level
    #[arg(short, long, value_name = "level", value_enum, default_value = "info")]
    verbosity: ArgVerbosity,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
enum ArgVerbosity {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt: CmdOpt = clap::Parser::parse();

    dotenvy::dotenv().ok();

    let default = format!("{:?}", opt.verbosity);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();

    let timeout = Duration::from_secs(opt.timeout);
    let config = ClientConfig {
        timeout,
        connect_timeout: timeout,
        tunnel_dns: opt.tunnel_dns,
        ..ClientConfig::default()
    };
    let mut client = Client::with_config(&opt.proxy, opt.proxy_port, config);
    if let Some(ip) = &opt.bind {
        client.set_outgoing_interface(ip)?;
    }
    client.add_method(NoAuth);
    if let Some(username) = &opt.username {
        let password = opt.password.clone().unwrap_or_default();
        client.add_method(UserKeyAuth::new(username, &password));
    }

    client.connect().await?;
    let bound = client.connect_to(&opt.host, opt.port).await?;
    log::info!("relay to {}:{} established, proxy bound {bound}", opt.host, opt.port);

    let req = format!("GET / HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n", opt.host);
    let Some(mut stream) = client.into_inner() else {
        return Err(socks5_connector::Error::NotConnected);
    };
    stream.write_all(req.as_bytes()).await?;

    let mut response = Vec::new();
    tokio::time::timeout(timeout, stream.read_to_end(&mut response))
        .await
        .map_err(std::io::Error::from)??;
    log::info!("read {} bytes", response.len());
    println!("{}", String::from_utf8_lossy(&response));

    Ok(())
}
