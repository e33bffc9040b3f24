//! Set and clear cells of a serpentine-wired WS2812 matrix.
//!
//! Every change is written to a [`WordSink`] as a complete frame, one GRB word
//! per LED in chain order.

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod frame;
pub mod layout;
#[cfg(target_arch = "arm")]
pub mod pio_sink;
pub mod protocol;
pub mod sink;

pub use frame::{FrameBuffer, InitError, Matrix5x5, SetError};
pub use layout::{GridLayout, OutOfRange, PhysicalIndex, HEIGHT, PIXEL_COUNT, WIDTH};
pub use protocol::{encode, Color, OFF};
pub use sink::{TransmitTimeout, WordSink};
