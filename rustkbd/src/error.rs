use snafu::Snafu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Layer index {index} does not exist"))]
    InvalidLayer { index: u8 },
    #[snafu(display("No switch at row {row}, column {col}"))]
    InvalidSwitch { row: u8, col: u8 },
    #[snafu(display("Failed to read from storage"))]
    StorageRead,
    #[snafu(display("Failed to write to storage"))]
    StorageWrite,
}
