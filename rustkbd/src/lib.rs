#![cfg_attr(not(test), no_std)]

extern crate self as rustkbd;

pub mod audio;
mod error;
pub mod keyboard;
mod logging;
pub mod storage;
pub mod usb;

pub use error::Error;
pub use heapless::Vec;
