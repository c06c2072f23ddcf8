use serde::de::DeserializeOwned;
use serde::Serialize;

/// A versioned JSON document kept in a [`RecordStore`](super::RecordStore).
///
/// Each document type lives in its own `<KIND>.json` file.
pub trait Document: Serialize + DeserializeOwned + Default {
    /// File stem, e.g. `scoresheet` for `scoresheet.json`.
    const KIND: &'static str;

    /// Format version written by this build. Files with any other version are rejected.
    const VERSION: u32;

    /// Version read from the file.
    fn version(&self) -> u32;

    /// Restore invariants after deserializing.
    fn after_load(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Unsupported {kind} version: {found} (expected {expected})")]
    UnsupportedVersion {
        kind: &'static str,
        found: u32,
        expected: u32,
    },
    #[error("No {kind} ids left after {last}")]
    IdSpaceExhausted { kind: &'static str, last: u64 },
}

/// The id after `id`. Fails at `u64::MAX` rather than wrapping, which would hand out ids again.
pub fn id_after(kind: &'static str, id: u64) -> Result<u64, StoreError> {
    id.checked_add(1)
        .ok_or(StoreError::IdSpaceExhausted { kind, last: id })
}
