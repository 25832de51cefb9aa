//! CBOR encoding for persisted motion snapshots.
//!
//! Snapshots are written with `ciborium`.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CBOR encoding failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

/// Serialize to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}

/// Deserialize from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{Ballot, Motion, SessionDuration};
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_motion_snapshot_preserves_state() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut motion = Motion::new("Budget 2025", None, t0).unwrap();
        motion
            .open_session(t0, SessionDuration::new(Some(2), None))
            .unwrap();
        motion.record_vote("111", Ballot::Yes, t0).unwrap();
        motion.close_if_elapsed(t0 + Duration::from_secs(300)).unwrap();

        let bytes = to_cbor(&motion).unwrap();
        let restored: Motion = from_cbor(&bytes).unwrap();

        assert_eq!(restored, motion);
        assert!(restored.is_closed());
        assert_eq!(restored.yes_count(), 1);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result: Result<Motion, _> = from_cbor(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(SerializationError::Decode(_))));
    }
}
