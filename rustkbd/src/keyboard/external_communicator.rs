use super::{Key, MouseReport};

pub trait ExternalCommunicator {
    type Error;
    fn is_ready(&self) -> bool;
    fn send_keys(&self, keys: &[Key]) -> Result<(), Self::Error>;
    fn send_mouse(&self, report: &MouseReport) -> Result<(), Self::Error>;
}
