//! Test doubles shared by the unit tests

use std::collections::{BTreeMap, VecDeque};
use std::vec::Vec;

use inclino_hal::{FlashError, FlashStorage, StorageKey};

use crate::attitude::RawBurst;
use crate::traits::{SampleSource, SourceError};

/// In-memory key/value flash
#[derive(Debug, Default)]
pub struct MemoryFlash {
    items: BTreeMap<u8, Vec<u8>>,
    /// Fail every write with `FlashError::Flash`
    pub fail_writes: bool,
    /// Number of successful writes
    pub writes: usize,
}

impl MemoryFlash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under a key, bypassing the trait
    pub fn insert(&mut self, key: StorageKey, data: &[u8]) {
        self.items.insert(key.as_u8(), data.to_vec());
    }

    pub fn get(&self, key: StorageKey) -> Option<&[u8]> {
        self.items.get(&key.as_u8()).map(Vec::as_slice)
    }

    /// Flip the bits of one stored byte
    pub fn corrupt(&mut self, key: StorageKey, index: usize) {
        if let Some(byte) = self
            .items
            .get_mut(&key.as_u8())
            .and_then(|item| item.get_mut(index))
        {
            *byte ^= 0xFF;
        }
    }
}

impl FlashStorage for MemoryFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let item = self.items.get(&key.as_u8()).ok_or(FlashError::NotFound)?;
        if buffer.len() < item.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..item.len()].copy_from_slice(item);
        Ok(item.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        self.items.insert(key.as_u8(), data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// Sample source that replays a fixed script
///
/// Once the script runs out every read fails with a transport error.
#[derive(Debug)]
pub struct ScriptedSource {
    init: Result<(), SourceError>,
    script: VecDeque<Result<RawBurst, SourceError>>,
    pub reads: usize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<RawBurst, SourceError>>) -> Self {
        Self {
            init: Ok(()),
            script: script.into_iter().collect(),
            reads: 0,
        }
    }

    pub fn failing_init(mut self, error: SourceError) -> Self {
        self.init = Err(error);
        self
    }
}

impl SampleSource for ScriptedSource {
    fn init(&mut self) -> Result<(), SourceError> {
        self.init
    }

    fn read_burst(&mut self) -> Result<RawBurst, SourceError> {
        self.reads += 1;
        self.script
            .pop_front()
            .unwrap_or(Err(SourceError::Transport))
    }
}

/// Burst for a level sensor lying flat
pub fn level_burst() -> RawBurst {
    RawBurst::from_words([0, 0, 16384], 0, [0, 0, 0])
}
