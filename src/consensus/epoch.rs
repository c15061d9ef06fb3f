// Epoch - block-height derived clock
use crate::engine::host::ChainClock;
use crate::types::{BlockNumber, EpochNumber};
use serde::{Deserialize, Serialize};

/// Epoch containing `block`
pub fn epoch_from_block(block: BlockNumber, epoch_length: u64) -> EpochNumber {
    if epoch_length == 0 {
        return 0;
    }
    block / epoch_length
}

/// First block of `epoch`
pub fn epoch_start_block(epoch: EpochNumber, epoch_length: u64) -> BlockNumber {
    epoch.saturating_mul(epoch_length)
}

/// Chain clock driven by the host's block height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockClock {
    epoch_length: u64,
    block: BlockNumber,
}

impl BlockClock {
    pub fn new(epoch_length: u64) -> Self {
        Self {
            epoch_length,
            block: 0,
        }
    }

    pub fn block(&self) -> BlockNumber {
        self.block
    }

    pub fn set_block(&mut self, block: BlockNumber) {
        self.block = block;
    }

    /// Jump to the first block of `epoch`
    pub fn advance_to_epoch(&mut self, epoch: EpochNumber) {
        self.block = self.block.max(epoch_start_block(epoch, self.epoch_length));
    }
}

impl ChainClock for BlockClock {
    fn current_chain_epoch(&self) -> EpochNumber {
        epoch_from_block(self.block, self.epoch_length)
    }
}
