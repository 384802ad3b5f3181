use std::io::Read;
use std::time::Duration;
use log::{debug, warn};
use serialport::SerialPort;
use crate::drivers::source::LineSource;
use crate::drivers::ScopeError;
/// Baud rates offered by the board firmware.
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];
/// A line longer than this without a terminator is treated as line noise.
const MAX_PENDING_BYTES: usize = 4096;
/// Splits an incoming byte stream into `\n`-terminated lines.
#[derive(Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}
impl LineFramer {
    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        if self.pending.len() > MAX_PENDING_BYTES && !self.has_line() {
            warn!(
                "discarding {} buffered bytes without a line terminator",
                self.pending.len()
            );
            self.pending.clear();
        }
    }
    pub fn has_line(&self) -> bool {
        self.pending.contains(&b'\n')
    }
    /// Pops the next complete line without its terminator.
    pub fn next_line(&mut self) -> Option<Result<String, ScopeError>> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(
            String::from_utf8(line)
                .map_err(|e| ScopeError::Transport(format!("line is not valid UTF-8: {e}"))),
        )
    }
}
/// Serial port transport. Only bytes the driver reports as already received
/// are read, so polling never blocks the engine loop.
pub struct SerialLineSource {
    port: Box<dyn SerialPort>,
    framer: LineFramer,
}
impl SerialLineSource {
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, ScopeError> {
        if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
            warn!("baud rate {baud_rate} is not one the firmware normally uses");
        }
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;
        debug!("opened {port_name} at {baud_rate} baud");
        Ok(Self {
            port,
            framer: LineFramer::default(),
        })
    }
    fn fill(&mut self) -> Result<(), ScopeError> {
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(());
        }
        let mut buf = vec![0u8; available];
        let read = self.port.read(&mut buf)?;
        self.framer.extend(&buf[..read]);
        Ok(())
    }
}
impl LineSource for SerialLineSource {
    fn has_data(&mut self) -> Result<bool, ScopeError> {
        if !self.framer.has_line() {
            self.fill()?;
        }
        Ok(self.framer.has_line())
    }
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        match self.framer.next_line() {
            Some(line) => line.map(Some),
            None => Err(ScopeError::Transport(
                "read_line called without a complete line buffered".into(),
            )),
        }
    }
}
/// Names of the serial ports currently visible to the OS.
pub fn available_port_names() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("cannot enumerate serial ports: {e}");
            Vec::new()
        }
    }
}
