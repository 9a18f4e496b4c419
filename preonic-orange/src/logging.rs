#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info};
#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, info};
