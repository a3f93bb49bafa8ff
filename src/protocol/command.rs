/// SOCKS5 request command. Only `CONNECT` is issued by this client.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub enum Command {
    #[default]
    Connect = 0x01,
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Connect => 0x01,
        }
    }
}
