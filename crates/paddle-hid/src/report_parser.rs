//! Little-endian cursor helpers for wireless payloads and HID reports

use crate::{HidError, HidResult};

/// Borrowing read cursor over a received payload.
pub struct ReportParser<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportParser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn read_u8(&mut self) -> HidResult<u8> {
        let value = *self
            .buffer
            .get(self.position)
            .ok_or(HidError::UnexpectedEnd {
                offset: self.position,
            })?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16_le(&mut self) -> HidResult<u16> {
        let lo = self.read_u8()?;
        let hi = self.read_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

/// Append-only writer for outgoing reports.
pub struct ReportBuilder {
    buffer: Vec<u8>,
}

impl ReportBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::with_capacity(crate::REPORT_SIZE)
    }
}
