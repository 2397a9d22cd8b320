use crate::ls8::{arch::MEMORY_SIZE, errors::VmError};

/// Flat byte-addressed RAM shared by code and stack.
#[derive(Clone)]
pub struct Ram {
    mem: [u8; MEMORY_SIZE],
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        Self {
            mem: [0; MEMORY_SIZE],
        }
    }

    pub fn read(&self, addr: usize) -> Result<u8, VmError> {
        self.mem
            .get(addr)
            .copied()
            .ok_or(VmError::AddressOutOfBounds { address: addr })
    }

    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), VmError> {
        let byte = self
            .mem
            .get_mut(addr)
            .ok_or(VmError::AddressOutOfBounds { address: addr })?;
        *byte = value;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.mem.fill(0);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mem
    }
}
