//! Scripted in-memory peer for exercising the client without sockets.

use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

#[derive(Debug)]
pub(crate) struct MockStream {
    input: VecDeque<u8>,
    read_chunk: usize,
    interleave: bool,
    step: usize,
    eof: bool,
    timed_out: bool,
    max_write: usize,
    alternate_zero_writes: bool,
    zero_turn: bool,
    close_after: Option<usize>,
    pub written: Vec<u8>,
    pub largest_write: usize,
    pub zero_writes: usize,
}

impl MockStream {
    /// A peer that will answer with `input`, then stall without closing.
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            read_chunk: usize::MAX,
            interleave: false,
            step: 0,
            eof: false,
            timed_out: false,
            max_write: usize::MAX,
            alternate_zero_writes: false,
            zero_turn: false,
            close_after: None,
            written: Vec::new(),
            largest_write: 0,
            zero_writes: 0,
        }
    }

    pub fn read_chunk(mut self, size: usize) -> Self {
        self.read_chunk = size;
        self
    }

    /// Alternates deliveries with a pending poll and a `WouldBlock` error.
    pub fn interleave_empty_reads(mut self) -> Self {
        self.interleave = true;
        self
    }

    pub fn eof_when_drained(mut self) -> Self {
        self.eof = true;
        self
    }

    pub fn report_timeout(mut self) -> Self {
        self.timed_out = true;
        self
    }

    pub fn max_write(mut self, size: usize) -> Self {
        self.max_write = size;
        self
    }

    pub fn interleave_zero_writes(mut self) -> Self {
        self.alternate_zero_writes = true;
        self
    }

    /// Fails writes with a broken pipe once `limit` bytes were accepted.
    pub fn close_after(mut self, limit: usize) -> Self {
        self.close_after = Some(limit);
        self
    }
}

impl AsyncRead for MockStream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.timed_out {
            return Poll::Ready(Err(io::ErrorKind::TimedOut.into()));
        }
        if this.interleave {
            this.step += 1;
            match this.step % 4 {
                1 => {
                    cx.waker().wake_by_ref();
                    return Poll::Pending;
                }
                3 => return Poll::Ready(Err(io::ErrorKind::WouldBlock.into())),
                _ => {}
            }
        }
        if this.input.is_empty() {
            return if this.eof { Poll::Ready(Ok(())) } else { Poll::Pending };
        }
        let n = this.read_chunk.min(buf.remaining()).min(this.input.len());
        let chunk: Vec<u8> = this.input.drain(..n).collect();
        buf.put_slice(&chunk);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let mut n = buf.len().min(this.max_write);
        if let Some(limit) = this.close_after {
            if this.written.len() >= limit {
                return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
            }
            n = n.min(limit - this.written.len());
        }
        if this.alternate_zero_writes {
            this.zero_turn = !this.zero_turn;
            if this.zero_turn {
                n = 0;
            }
        }
        if n == 0 {
            this.zero_writes += 1;
        }
        this.written.extend_from_slice(&buf[..n]);
        this.largest_write = this.largest_write.max(n);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
