use crate::{Error, Result};
use async_trait::async_trait;
use std::{future::Future, io::ErrorKind, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    time::Instant,
};

/// Largest slice handed to a single write attempt.
pub const CHUNK_SIZE: usize = 4096;

/// Pause after an attempt that made no progress.
pub const BACKOFF: Duration = Duration::from_millis(200);

/// Added to the configured timeout to form the absolute deadline of one operation.
pub const HARD_TIMEOUT_GRACE: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Reading,
    Writing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Reading => write!(f, "reading"),
            Direction::Writing => write!(f, "writing"),
        }
    }
}

/// The two deadline tiers applied to every `send`/`recv`.
///
/// `soft` bounds a single read or write attempt; `hard` bounds the whole operation,
/// counted from its start, and fires even when the transport never reports a timeout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IoTimeouts {
    pub soft: Option<Duration>,
    pub hard: Duration,
}

impl IoTimeouts {
    pub fn new(timeout: Duration) -> Self {
        Self {
            soft: Some(timeout),
            hard: timeout + HARD_TIMEOUT_GRACE,
        }
    }

    /// Keeps only the hard deadline, for transports that enforce no timeout of their own.
    pub fn without_soft(self) -> Self {
        Self { soft: None, ..self }
    }
}

/// Byte-exact I/O capability handed to authenticators and used by the protocol engine.
#[async_trait]
pub trait FramedIo: Send {
    /// Writes every byte of `buf` or fails.
    async fn send(&mut self, buf: &[u8]) -> Result<()>;

    /// Reads until `len` bytes arrived. Fewer bytes are returned only when the peer
    /// closed the stream first; callers must check the length.
    async fn recv(&mut self, len: usize) -> Result<Vec<u8>>;
}

/// A stream wrapped with the deadline-enforcing `send`/`recv` primitives.
#[derive(Debug)]
pub struct Framed<S> {
    stream: S,
    timeouts: IoTimeouts,
}

impl<S> Framed<S> {
    pub fn new(stream: S, timeouts: IoTimeouts) -> Self {
        Self { stream, timeouts }
    }

    pub fn timeouts(&self) -> IoTimeouts {
        self.timeouts
    }

    pub fn set_timeouts(&mut self, timeouts: IoTimeouts) {
        self.timeouts = timeouts;
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

enum Attempt<T> {
    Ready(T),
    Backoff,
    Closed,
}

async fn attempt<F, T>(direction: Direction, soft: Option<Duration>, deadline: Instant, op: F) -> Result<Attempt<T>>
where
    F: Future<Output = std::io::Result<T>>,
{
    let bounded = async move {
        match soft {
            Some(limit) => tokio::time::timeout(limit, op).await.map_err(|_| Error::SoftTimeout(direction)),
            None => Ok(op.await),
        }
    };
    let outcome = tokio::time::timeout_at(deadline, bounded)
        .await
        .map_err(|_| Error::HardTimeout(direction))??;

    match outcome {
        Ok(value) => Ok(Attempt::Ready(value)),
        Err(e) => match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::Interrupted => Ok(Attempt::Backoff),
            ErrorKind::TimedOut => Err(Error::SoftTimeout(direction)),
            ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::UnexpectedEof => {
                Ok(Attempt::Closed)
            }
            _ => Err(e.into()),
        },
    }
}

async fn backoff(direction: Direction, deadline: Instant) -> Result<()> {
    log::trace!("no progress while {direction}, backing off {BACKOFF:?}");
    tokio::time::sleep(BACKOFF).await;
    if Instant::now() >= deadline {
        return Err(Error::HardTimeout(direction));
    }
    Ok(())
}

#[async_trait]
impl<S> FramedIo for Framed<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, buf: &[u8]) -> Result<()> {
        let direction = Direction::Writing;
        let deadline = Instant::now() + self.timeouts.hard;
        let soft = self.timeouts.soft;

        let mut pos = 0;
        while pos < buf.len() {
            let end = buf.len().min(pos + CHUNK_SIZE);
            match attempt(direction, soft, deadline, self.stream.write(&buf[pos..end])).await? {
                Attempt::Ready(0) | Attempt::Backoff => backoff(direction, deadline).await?,
                Attempt::Ready(n) => pos += n,
                Attempt::Closed => break,
            }
        }

        if pos != buf.len() {
            return Err(Error::ShortWrite(buf.len() - pos));
        }

        loop {
            match attempt(direction, soft, deadline, self.stream.flush()).await? {
                Attempt::Ready(()) => return Ok(()),
                Attempt::Backoff => backoff(direction, deadline).await?,
                Attempt::Closed => return Err(std::io::Error::from(ErrorKind::BrokenPipe).into()),
            }
        }
    }

    async fn recv(&mut self, len: usize) -> Result<Vec<u8>> {
        let direction = Direction::Reading;
        let deadline = Instant::now() + self.timeouts.hard;
        let soft = self.timeouts.soft;

        let mut buf = vec![0; len];
        let mut filled = 0;
        while filled < len {
            match attempt(direction, soft, deadline, self.stream.read(&mut buf[filled..])).await? {
                Attempt::Ready(0) | Attempt::Closed => {
                    log::debug!("peer closed the stream after {filled} of {len} bytes");
                    break;
                }
                Attempt::Ready(n) => filled += n,
                Attempt::Backoff => backoff(direction, deadline).await?,
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockStream;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn recv_reassembles_fragments() {
        let payload: Vec<u8> = (1..=32).collect();

        let mut whole = Framed::new(MockStream::new(&payload), IoTimeouts::new(TIMEOUT));
        let expected = whole.recv(payload.len()).await.unwrap();

        let fragmented = MockStream::new(&payload).read_chunk(1).interleave_empty_reads();
        let mut framed = Framed::new(fragmented, IoTimeouts::new(TIMEOUT));
        let received = framed.recv(payload.len()).await.unwrap();

        assert_eq!(received, expected);
        assert_eq!(received, payload);
    }

    #[tokio::test(start_paused = true)]
    async fn recv_stops_at_requested_length() {
        let mut framed = Framed::new(MockStream::new(&[1, 2, 3, 4, 5]), IoTimeouts::new(TIMEOUT));
        assert_eq!(framed.recv(2).await.unwrap(), vec![1, 2]);
        assert_eq!(framed.recv(3).await.unwrap(), vec![3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn recv_returns_short_buffer_on_eof() {
        let mut framed = Framed::new(MockStream::new(&[5, 0, 0]).eof_when_drained(), IoTimeouts::new(TIMEOUT));
        assert_eq!(framed.recv(10).await.unwrap(), vec![5, 0, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn send_delivers_in_bounded_chunks() {
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let stream = MockStream::new(&[]).max_write(CHUNK_SIZE).interleave_zero_writes();
        let mut framed = Framed::new(stream, IoTimeouts::new(TIMEOUT));

        framed.send(&payload).await.unwrap();

        let stream = framed.into_inner();
        assert_eq!(stream.written, payload);
        assert!(stream.largest_write <= CHUNK_SIZE);
        assert!(stream.zero_writes > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn send_reports_shortfall_when_peer_closes() {
        let stream = MockStream::new(&[]).max_write(3).close_after(6);
        let mut framed = Framed::new(stream, IoTimeouts::new(TIMEOUT));

        let err = framed.send(&[0; 10]).await.unwrap_err();
        assert!(matches!(err, Error::ShortWrite(4)), "{err:?}");
        assert_eq!(err.to_string(), "Writing short 4 bytes");
    }

    #[tokio::test(start_paused = true)]
    async fn soft_timeout_fires_on_idle_attempt() {
        let start = Instant::now();
        let mut framed = Framed::new(MockStream::new(&[]), IoTimeouts::new(Duration::from_secs(3)));

        let err = framed.recv(2).await.unwrap_err();
        assert!(matches!(err, Error::SoftTimeout(Direction::Reading)), "{err:?}");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(3) + HARD_TIMEOUT_GRACE);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_timeout_is_soft() {
        let mut framed = Framed::new(MockStream::new(&[]).report_timeout(), IoTimeouts::new(TIMEOUT));
        let err = framed.recv(2).await.unwrap_err();
        assert!(matches!(err, Error::SoftTimeout(Direction::Reading)), "{err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn hard_timeout_without_soft_timer() {
        let timeout = Duration::from_secs(3);
        let start = Instant::now();
        let mut framed = Framed::new(MockStream::new(&[]), IoTimeouts::new(timeout).without_soft());

        let err = framed.recv(2).await.unwrap_err();
        assert!(matches!(err, Error::HardTimeout(Direction::Reading)), "{err:?}");
        assert!(err.is_timeout());
        let elapsed = start.elapsed();
        assert!(elapsed >= timeout + HARD_TIMEOUT_GRACE);
        assert!(elapsed < timeout + HARD_TIMEOUT_GRACE + BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn hard_timeout_bounds_zero_byte_writes() {
        let timeout = Duration::from_secs(1);
        let stream = MockStream::new(&[]).max_write(0);
        let mut framed = Framed::new(stream, IoTimeouts::new(timeout));

        let start = Instant::now();
        let err = framed.send(b"hello").await.unwrap_err();
        assert!(matches!(err, Error::HardTimeout(Direction::Writing)), "{err:?}");
        assert!(start.elapsed() <= timeout + HARD_TIMEOUT_GRACE + BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn works_over_duplex_pipe() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut framed = Framed::new(client, IoTimeouts::new(TIMEOUT));

        let echo = tokio::spawn(async move {
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).await.unwrap();
            server.write_all(&buf).await.unwrap();
            server
        });

        framed.send(b"ping!").await.unwrap();
        assert_eq!(framed.recv(5).await.unwrap(), b"ping!".to_vec());
        drop(echo.await.unwrap());
        assert!(framed.recv(1).await.unwrap().is_empty());
    }
}
