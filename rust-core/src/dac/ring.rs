//! Lock-free hand-off of converter codes
//!
//! The tick side pushes into a single-producer ring without blocking or
//! allocating; the consumer side drains at its own pace.

use super::DacChannel;
use crate::error::Result;
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Create a converter channel and the consumer for the codes it receives
///
/// # Arguments
/// * `capacity` - Ring capacity in codes
pub fn code_channel(capacity: usize) -> (RingDac, CodeConsumer) {
    let rb = HeapRb::<u8>::new(capacity.max(1));
    let (producer, consumer) = rb.split();

    (
        RingDac {
            producer,
            dropped: 0,
        },
        CodeConsumer { consumer },
    )
}

/// Converter channel writing codes into a ring buffer
pub struct RingDac {
    producer: HeapProducer<u8>,
    dropped: u64,
}

impl RingDac {
    /// Codes discarded because the ring was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl DacChannel for RingDac {
    #[inline]
    fn write_code(&mut self, code: u8) -> Result<()> {
        if self.producer.push(code).is_err() {
            self.dropped += 1;
        }
        Ok(())
    }
}

/// Reading end of a [`code_channel`]
pub struct CodeConsumer {
    consumer: HeapConsumer<u8>,
}

impl CodeConsumer {
    /// Take the oldest code, if any
    pub fn pop(&mut self) -> Option<u8> {
        self.consumer.pop()
    }

    /// Read codes into `buffer`; returns the number read
    pub fn read(&mut self, buffer: &mut [u8]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Take every pending code
    pub fn drain(&mut self) -> Vec<u8> {
        let mut codes = Vec::with_capacity(self.consumer.len());
        while let Some(code) = self.consumer.pop() {
            codes.push(code);
        }
        codes
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through_in_order() {
        let (mut dac, mut codes) = code_channel(8);
        for code in [1, 2, 3] {
            dac.write_code(code).unwrap();
        }

        assert_eq!(codes.len(), 3);
        assert_eq!(codes.pop(), Some(1));
        assert_eq!(codes.drain(), vec![2, 3]);
        assert!(codes.is_empty());
    }

    #[test]
    fn test_full_ring_drops_without_blocking() {
        let (mut dac, mut codes) = code_channel(2);
        for code in 0..5 {
            dac.write_code(code).unwrap();
        }

        assert_eq!(dac.dropped(), 3);
        let mut buffer = [0u8; 4];
        assert_eq!(codes.read(&mut buffer), 2);
        assert_eq!(&buffer[..2], &[0, 1]);
    }
}
