use crate::virtual_machine::errors::VMError;
use std::collections::HashMap;
use std::ops::Range;

/// Addresses below this bound are always kept in the dense region.
const DENSE_FLOOR: usize = 4096;

/// Sparse, auto-growing word-addressed memory.
///
/// Memory layout: `[dense region][sparse region]`
/// - **Dense region**: a vector covering the loaded program plus headroom. Writes just
///   past its end extend it, so ordinary programs never touch the map.
/// - **Sparse region**: a hash map for addresses far beyond the dense end. Programs that
///   scribble a few words at huge addresses pay for those words only.
///
/// Never-written addresses read as zero, and memory never shrinks.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    dense: Vec<i64>,
    sparse: HashMap<usize, i64>,
    /// One past the highest address ever written or loaded.
    extent: usize,
}

impl Memory {
    /// Creates memory whose low addresses hold `words`.
    pub fn new(words: &[i64]) -> Self {
        Self {
            dense: words.to_vec(),
            sparse: HashMap::new(),
            extent: words.len(),
        }
    }

    /// Largest address that a write may extend the dense region to.
    fn dense_limit(&self) -> usize {
        (self.dense.len() * 2).max(DENSE_FLOOR)
    }

    /// Reads the word at `addr`. Addresses never written read as zero.
    #[inline]
    pub fn get(&self, addr: usize) -> i64 {
        match self.dense.get(addr) {
            Some(value) => *value,
            None => self.sparse.get(&addr).copied().unwrap_or(0),
        }
    }

    /// Stores `value` at `addr`, growing the backing storage as needed.
    pub fn set(&mut self, addr: usize, value: i64) {
        if addr < self.dense.len() {
            self.dense[addr] = value;
        } else if addr < self.dense_limit() {
            self.grow_dense(addr + 1);
            self.dense[addr] = value;
        } else {
            self.sparse.insert(addr, value);
        }
        self.extent = self.extent.max(addr.saturating_add(1));
    }

    /// Extends the dense region to `len` words, pulling in any words that
    /// had been parked in the sparse map below the new end.
    fn grow_dense(&mut self, len: usize) {
        let start = self.dense.len();
        self.dense.resize(len, 0);
        if self.sparse.is_empty() {
            return;
        }
        for addr in start..len {
            if let Some(value) = self.sparse.remove(&addr) {
                self.dense[addr] = value;
            }
        }
    }

    /// Reads the word at a signed address.
    ///
    /// Returns [`VMError::InvalidAddress`] if `addr` is negative.
    pub fn read(&self, addr: i64) -> Result<i64, VMError> {
        Ok(self.get(Self::index(addr)?))
    }

    /// Writes the word at a signed address.
    ///
    /// Returns [`VMError::InvalidAddress`] if `addr` is negative.
    pub fn write(&mut self, addr: i64, value: i64) -> Result<(), VMError> {
        self.set(Self::index(addr)?, value);
        Ok(())
    }

    /// Converts a signed address into an index.
    pub fn index(addr: i64) -> Result<usize, VMError> {
        usize::try_from(addr).map_err(|_| VMError::InvalidAddress { address: addr })
    }

    /// One past the highest address ever written or loaded.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Number of words held in the sparse region.
    pub fn sparse_len(&self) -> usize {
        self.sparse.len()
    }

    /// Copies out the words in `range`, zero-filling unwritten addresses.
    pub fn snapshot(&self, range: Range<usize>) -> Vec<i64> {
        range.map(|addr| self.get(addr)).collect()
    }
}
