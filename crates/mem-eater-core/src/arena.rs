//! Never-freed store of acquired memory blocks.

use std::hint::black_box;

use crate::config::MIB;

/// Holds every block the harness has taken. Blocks are only ever added.
#[derive(Debug)]
pub struct BlockArena {
    blocks: Vec<Box<[u8]>>,
    block_size: usize,
}

impl BlockArena {
    pub fn new(block_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_size,
        }
    }

    /// Allocates one block and writes zeros over all of it.
    ///
    /// Every page must be written so the kernel backs it. `black_box` keeps the
    /// compiler from folding allocate-then-zero into a zeroed allocation, which
    /// may be served from untouched copy-on-write zero pages.
    pub fn acquire(&mut self) {
        let mut block: Vec<u8> = black_box(Vec::with_capacity(self.block_size));
        block.resize(self.block_size, 0);
        self.blocks.push(black_box(block).into_boxed_slice());
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn consumed_bytes(&self) -> u64 {
        self.blocks.len() as u64 * self.block_size as u64
    }

    pub fn consumed_mib(&self) -> u64 {
        self.consumed_bytes() / MIB as u64
    }
}
