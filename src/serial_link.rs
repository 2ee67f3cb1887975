use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use futures::{FutureExt, SinkExt, StreamExt};
use tokio::time::{timeout, Duration};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::warn;

use crate::error::{Result, SweepError};

pub(crate) const MAX_LINE_LENGTH: usize = 256;
pub(crate) const TIMEOUT: u64 = 100;

pub trait LineSource: Send {
    /// Returns `Ok(None)` when no complete line is buffered yet.
    fn try_read_line(&mut self) -> Result<Option<String>>;
}

#[async_trait]
pub trait LineSink: Send {
    async fn write_line(&mut self, line: &str) -> Result<()>;
}

pub trait Link: LineSource + LineSink {}

impl<T: LineSource + LineSink> Link for T {}

/// Newline delimited text codec.
///
/// Trailing `\r` is dropped from decoded lines. Lines longer than
/// `MAX_LINE_LENGTH` are thrown away whole, however they arrive.
pub struct LineProtocol {
    terminator: &'static str,
    discarding: bool,
}

impl LineProtocol {
    pub fn controller() -> LineProtocol {
        LineProtocol {
            terminator: "\r\n",
            discarding: false,
        }
    }

    pub fn client() -> LineProtocol {
        LineProtocol {
            terminator: "\n",
            discarding: false,
        }
    }
}

impl Decoder for LineProtocol {
    type Item = String;
    type Error = SweepError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            let newline = match src.iter().position(|b| *b == b'\n') {
                Some(newline) => newline,
                None => {
                    if src.len() > MAX_LINE_LENGTH {
                        warn!(len = src.len(), "discarding over-long input line");
                        src.clear();
                        self.discarding = true;
                    }
                    return Ok(None);
                }
            };
            let raw = src.split_to(newline + 1);
            if self.discarding {
                self.discarding = false;
                continue;
            }
            if newline > MAX_LINE_LENGTH {
                warn!(len = newline, "discarding over-long input line");
                continue;
            }
            let mut line = &raw[..newline];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            return Ok(Some(String::from_utf8_lossy(line).into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() || self.discarding || src.len() > MAX_LINE_LENGTH {
            src.clear();
            return Ok(None);
        }
        let rest = src.split();
        Ok(Some(String::from_utf8_lossy(&rest).trim_end_matches('\r').to_owned()))
    }
}

impl Encoder<String> for LineProtocol {
    type Error = SweepError;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<()> {
        buf.reserve(line.len() + self.terminator.len());
        buf.put(line.as_bytes());
        buf.put(self.terminator.as_bytes());
        Ok(())
    }
}

pub struct FramedSerialLink {
    framed_port: Framed<SerialStream, LineProtocol>,
}

impl FramedSerialLink {
    pub fn open(port: &str, baud_rate: u32, protocol: LineProtocol) -> Result<FramedSerialLink> {
        let serial_port = tokio_serial::new(port, baud_rate)
            .timeout(Duration::from_millis(TIMEOUT))
            .open_native_async()?;
        Ok(FramedSerialLink {
            framed_port: protocol.framed(serial_port),
        })
    }

    pub async fn read_line_timeout(&mut self, wait: Duration) -> Result<Option<String>> {
        match timeout(wait, self.framed_port.next()).await {
            Err(_) => Ok(None),
            Ok(None) => Err(SweepError::LinkClosed),
            Ok(Some(line)) => line.map(Some),
        }
    }
}

impl LineSource for FramedSerialLink {
    fn try_read_line(&mut self) -> Result<Option<String>> {
        match self.framed_port.next().now_or_never() {
            None => Ok(None),
            Some(None) => Err(SweepError::LinkClosed),
            Some(Some(line)) => line.map(Some),
        }
    }
}

#[async_trait]
impl LineSink for FramedSerialLink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.framed_port.send(line.to_owned()).await?;
        Ok(())
    }
}

pub fn available_ports() -> Result<Vec<String>> {
    let mut ports: Vec<String> = tokio_serial::available_ports()?
        .into_iter()
        .map(|port| port.port_name)
        .collect();
    ports.sort();
    ports.dedup();
    Ok(ports)
}

pub fn port_opens(port: &str, baud_rate: u32) -> bool {
    tokio_serial::new(port, baud_rate)
        .timeout(Duration::from_millis(TIMEOUT))
        .open_native_async()
        .is_ok()
}
