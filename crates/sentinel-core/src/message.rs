//! Status message broadcast to peer nodes.
//!
//! The wire encoding is postcard; the radio only sees an opaque byte
//! slice. Peer payloads that fail to decode are ignored by the listener.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::reading::{Emergency, EnvironmentalReading};

/// The radio link bounds a datagram payload to 250 bytes.
pub const MAX_PAYLOAD: usize = 250;

/// One node status datagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Wrapping per-node send counter.
    pub sequence: u16,
    pub reading: EnvironmentalReading,
    pub emergency: Emergency,
}

impl StatusMessage {
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fits_the_datagram_payload_even_at_extremes() {
        let message = StatusMessage {
            sequence: u16::MAX,
            reading: EnvironmentalReading {
                temperature: f32::MAX,
                pressure: f32::MAX,
                humidity: 100.0,
                gas_resistance: f32::MAX,
            },
            emergency: Emergency::Fall,
        };

        let frame = message.encode().unwrap();
        assert!(frame.len() <= MAX_PAYLOAD);
        assert_eq!(StatusMessage::decode(&frame).unwrap(), message);
    }

    #[test]
    fn garbage_payloads_are_rejected() {
        assert!(StatusMessage::decode(&[0xFF; 3]).is_err());
    }
}
