use crate::Error;

/// Persists the default layer across power cycles.
pub trait DefaultLayerStore {
    /// Returns the stored layer index, or `None` if nothing has been stored yet.
    fn load(&mut self) -> Result<Option<u8>, Error>;

    fn store(&mut self, index: u8) -> Result<(), Error>;
}

/// Keeps the default layer in RAM only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    index: Option<u8>,
}

impl MemoryStore {
    pub fn new(index: Option<u8>) -> Self {
        MemoryStore { index }
    }
}

impl DefaultLayerStore for MemoryStore {
    fn load(&mut self) -> Result<Option<u8>, Error> {
        Ok(self.index)
    }

    fn store(&mut self, index: u8) -> Result<(), Error> {
        self.index = Some(index);
        Ok(())
    }
}
