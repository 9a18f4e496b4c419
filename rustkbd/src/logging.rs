//! Log through `defmt` on the target and through `log` elsewhere.

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info, warn};
#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, info, warn};
