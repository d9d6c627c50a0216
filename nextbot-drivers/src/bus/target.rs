//! Receive/response buffer of the slave's I2C target
//!
//! The bus context appends what the master writes and hands out the staged
//! response when the master reads. The main loop consumes received bytes
//! and stages responses through [`I2cTarget`]. A `static` buffer is shared
//! by both contexts; every access takes a critical section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::{Deque, Vec};
use nextbot_hal::I2cTarget;
use nextbot_protocol::RESPONSE_LEN;

/// Received bytes held before the main loop consumes them
///
/// Room for a command, a data packet and some line noise.
pub const RX_CAPACITY: usize = 64;

struct Inner {
    rx: Deque<u8, RX_CAPACITY>,
    response: Option<Vec<u8, RESPONSE_LEN>>,
    dropped: u32,
}

/// Byte queue between the bus context and the main loop
pub struct TargetBuffer {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner>>,
}

impl Default for TargetBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                rx: Deque::new(),
                response: None,
                dropped: 0,
            })),
        }
    }

    /// Queue bytes written by the master
    ///
    /// Bytes that do not fit are dropped. Returns how many were queued.
    pub fn on_write(&self, bytes: &[u8]) -> usize {
        let queued = self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let mut queued = 0;
            for &b in bytes {
                if inner.rx.push_back(b).is_err() {
                    inner.dropped += (bytes.len() - queued) as u32;
                    break;
                }
                queued += 1;
            }
            queued
        });

        if queued < bytes.len() {
            #[cfg(feature = "defmt")]
            defmt::warn!("rx full, dropped {} bytes", bytes.len() - queued);
        }
        queued
    }

    /// Take the staged response for a master read
    ///
    /// Each response is handed out once; later reads find nothing staged.
    pub fn take_response(&self) -> Option<Vec<u8, RESPONSE_LEN>> {
        self.inner.lock(|inner| inner.borrow_mut().response.take())
    }

    /// Total bytes dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        self.inner.lock(|inner| inner.borrow().dropped)
    }
}

impl I2cTarget for &TargetBuffer {
    fn available(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().rx.len())
    }

    fn peek_at(&self, index: usize) -> Option<u8> {
        self.inner.lock(|inner| inner.borrow().rx.iter().nth(index).copied())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let mut n = 0;
            for slot in buf.iter_mut() {
                match inner.rx.pop_front() {
                    Some(b) => *slot = b,
                    None => break,
                }
                n += 1;
            }
            n
        })
    }

    fn respond(&mut self, data: &[u8]) {
        let len = data.len().min(RESPONSE_LEN);
        let mut staged = Vec::new();
        // Cannot fail, len <= RESPONSE_LEN
        let _ = staged.extend_from_slice(&data[..len]);
        self.inner.lock(|inner| inner.borrow_mut().response = Some(staged));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let buffer = TargetBuffer::new();
        assert_eq!(buffer.on_write(&[0x55, 1, 2]), 3);

        let mut target = &buffer;
        assert_eq!(target.available(), 3);
        assert_eq!(target.peek(), Some(0x55));
        assert_eq!(target.peek_at(2), Some(2));
        assert_eq!(target.peek_at(3), None);

        let mut buf = [0u8; 2];
        assert_eq!(target.read(&mut buf), 2);
        assert_eq!(buf, [0x55, 1]);
        assert_eq!(target.available(), 1);
    }

    #[test]
    fn test_short_read() {
        let buffer = TargetBuffer::new();
        buffer.on_write(&[9]);

        let mut buf = [0u8; 4];
        assert_eq!((&buffer).read(&mut buf), 1);
        assert_eq!(buf[0], 9);
        assert_eq!((&buffer).peek(), None);
    }

    #[test]
    fn test_overflow_drops_tail() {
        let buffer = TargetBuffer::new();
        let bytes = [0xAB; RX_CAPACITY + 6];
        assert_eq!(buffer.on_write(&bytes), RX_CAPACITY);
        assert_eq!(buffer.dropped(), 6);
        assert_eq!((&buffer).available(), RX_CAPACITY);
    }

    #[test]
    fn test_response_taken_once() {
        let buffer = TargetBuffer::new();
        assert!(buffer.take_response().is_none());

        (&buffer).respond(&[0xAA, 7, 0x50, 0x11]);
        let response = buffer.take_response().unwrap();
        assert_eq!(response.as_slice(), &[0xAA, 7, 0x50, 0x11]);
        assert!(buffer.take_response().is_none());
    }

    #[test]
    fn test_respond_replaces_staged() {
        let buffer = TargetBuffer::new();
        let mut target = &buffer;
        target.respond(&[0xAA, 1, 0x51, 0x11]);
        target.respond(&[0xAA, 2, 0x50, 0x11]);
        assert_eq!(buffer.take_response().unwrap()[1], 2);
    }
}
