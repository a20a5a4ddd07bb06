use crate::protocol::text::encoder::{MemcacheTextEncoder, Response, BAD_DATA_CHUNK};
use crate::protocol::text::network::MAX_KEY_LENGTH;
use bytes::{Buf, Bytes, BytesMut};
use std::cmp;
use std::io;
use std::io::{Error, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest request line, room for a multi get of 2048 maximum length keys
pub const MAX_LINE_LENGTH: usize = 2048 * (MAX_KEY_LENGTH + 1);

const READ_BUFFER_SIZE: usize = 8 * 1024;
const SKIP_CHUNK_SIZE: usize = 64 * 1024;

pub struct MemcacheTextConnection<S> {
    stream: S,
    encoder: MemcacheTextEncoder,
    buffer: BytesMut,
    output: BytesMut,
}

fn connection_reset() -> Error {
    Error::new(ErrorKind::ConnectionReset, "Connection reset by peer")
}

fn unexpected_eof() -> Error {
    Error::new(ErrorKind::UnexpectedEof, "Connection closed inside data block")
}

impl<S> MemcacheTextConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        MemcacheTextConnection {
            stream,
            encoder: MemcacheTextEncoder::new(),
            buffer: BytesMut::with_capacity(READ_BUFFER_SIZE),
            output: BytesMut::with_capacity(READ_BUFFER_SIZE),
        }
    }

    /// Reads one request line and strips its `\n` or `\r\n` terminator.
    ///
    /// Returns `None` on a clean end of stream. A line growing beyond
    /// [`MAX_LINE_LENGTH`] is an `InvalidData` error.
    pub async fn read_line(&mut self) -> io::Result<Option<Bytes>> {
        let mut scanned = 0;
        loop {
            if let Some(position) = self.buffer[scanned..].iter().position(|byte| *byte == b'\n')
            {
                let mut line = self.buffer.split_to(scanned + position + 1);
                line.truncate(line.len() - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(line.freeze()));
            }
            scanned = self.buffer.len();

            if self.buffer.len() > MAX_LINE_LENGTH {
                return Err(Error::new(ErrorKind::InvalidData, "Request line too long"));
            }

            // The remote closed the connection. For this to be a clean
            // shutdown, there should be no data in the read buffer.
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(connection_reset());
            }
        }
    }

    /// Reads a data block of `length` bytes followed by a line terminator
    pub async fn read_payload(&mut self, length: usize) -> io::Result<Bytes> {
        self.fill(length).await?;
        let payload = self.buffer.split_to(length).freeze();
        self.read_terminator().await?;
        Ok(payload)
    }

    /// Discards a data block of `length` bytes and its line terminator
    /// without buffering it whole.
    pub async fn skip_payload(&mut self, length: usize) -> io::Result<()> {
        debug!("Skip bytes {:?}", length);
        let buffered = cmp::min(length, self.buffer.len());
        self.buffer.advance(buffered);
        let mut remaining = length - buffered;
        while remaining > 0 {
            self.buffer.reserve(cmp::min(remaining, SKIP_CHUNK_SIZE));
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return Err(unexpected_eof());
            }
            let chunk = cmp::min(remaining, self.buffer.len());
            self.buffer.advance(chunk);
            remaining -= chunk;
        }
        self.read_terminator().await
    }

    async fn fill(&mut self, length: usize) -> io::Result<()> {
        if self.buffer.len() < length {
            self.buffer.reserve(length - self.buffer.len());
        }
        while self.buffer.len() < length {
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return Err(unexpected_eof());
            }
        }
        Ok(())
    }

    async fn read_terminator(&mut self) -> io::Result<()> {
        self.fill(1).await?;
        match self.buffer[0] {
            b'\n' => {
                self.buffer.advance(1);
                Ok(())
            }
            b'\r' => {
                self.fill(2).await?;
                if self.buffer[1] != b'\n' {
                    return Err(Error::new(ErrorKind::InvalidData, BAD_DATA_CHUNK));
                }
                self.buffer.advance(2);
                Ok(())
            }
            _ => Err(Error::new(ErrorKind::InvalidData, BAD_DATA_CHUNK)),
        }
    }

    pub async fn write(&mut self, response: &Response) -> io::Result<()> {
        self.output.clear();
        self.encoder.encode(response, &mut self.output);
        self.stream.write_all(&self.output[..]).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
