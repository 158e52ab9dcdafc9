//! Byte transport seam between the harness loop and the device.
//!
//! [`SerialTransport`] talks to real hardware; [`MemoryTransport`] is a
//! loopback-free in-memory double for tests and dry runs.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Duration;

use ogoa_types::OgoaError;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

/// Raw byte I/O with a short, bounded read.
pub trait Transport {
    /// Read whatever is available into `buf`.  A timeout is `Ok(0)`, not an
    /// error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, OgoaError>;

    /// Write some prefix of `data`, returning how much was taken.
    fn write(&mut self, data: &[u8]) -> Result<usize, OgoaError>;

    fn flush(&mut self) -> Result<(), OgoaError> {
        Ok(())
    }

    /// Write all of `data`, failing if the transport stops accepting bytes.
    fn write_all(&mut self, mut data: &[u8]) -> Result<(), OgoaError> {
        while !data.is_empty() {
            match self.write(data)? {
                0 => return Err(OgoaError::Transport("write returned 0 bytes".into())),
                n => data = &data[n..],
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serial
// ─────────────────────────────────────────────────────────────────────────────

/// How to open and prime a serial port.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub path: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    /// Pause after raising DTR/RTS before the buffers are cleared.
    pub settle_delay: Duration,
}

impl SerialSettings {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            read_timeout: Duration::from_millis(50),
            settle_delay: Duration::from_millis(1200),
        }
    }
}

/// 8N1 serial port without flow control.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open the port, assert DTR and RTS, wait for the device to settle and
    /// drop anything it sent while booting.
    ///
    /// # Errors
    ///
    /// [`OgoaError::Transport`] when the port cannot be opened or configured.
    pub fn open(settings: &SerialSettings) -> Result<Self, OgoaError> {
        let mut port = serialport::new(&settings.path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| serial_error(&settings.path, e))?;

        info!(port = %settings.path, baud = settings.baud_rate, "opened serial port");

        // USB CDC devices often stay silent until DTR is raised.
        port.write_data_terminal_ready(true)
            .map_err(|e| serial_error(&settings.path, e))?;
        port.write_request_to_send(true)
            .map_err(|e| serial_error(&settings.path, e))?;

        std::thread::sleep(settings.settle_delay);
        port.clear(ClearBuffer::All)
            .map_err(|e| serial_error(&settings.path, e))?;
        debug!(settle_ms = settings.settle_delay.as_millis() as u64, "serial port ready");

        Ok(Self { port })
    }
}

fn serial_error(path: &str, e: serialport::Error) -> OgoaError {
    OgoaError::Transport(format!("{path}: {e}"))
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, OgoaError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(OgoaError::Transport(e.to_string())),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, OgoaError> {
        self.port
            .write(data)
            .map_err(|e| OgoaError::Transport(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), OgoaError> {
        self.port
            .flush()
            .map_err(|e| OgoaError::Transport(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// Scripted transport: reads drain queued inbound chunks, writes are
/// captured.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<Vec<u8>>,
    outbound: Vec<u8>,
    fail_reads: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by one future `read` call.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.inbound.push_back(bytes.to_vec());
    }

    /// Make the next `n` reads fail.
    pub fn fail_next_reads(&mut self, n: usize) {
        self.fail_reads = n;
    }

    pub fn written(&self) -> &[u8] {
        &self.outbound
    }

    /// Drain and return everything written so far.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, OgoaError> {
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(OgoaError::Transport("injected read failure".into()));
        }
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.inbound.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, OgoaError> {
        self.outbound.extend_from_slice(data);
        Ok(data.len())
    }
}
