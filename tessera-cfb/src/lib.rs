//! Retained-mode character framebuffer with deferred tile compositing
//!
//! Drawing calls on a [`Display`] are recorded as commands. When the caller
//! finalizes, the command sequence is replayed into a pixel buffer and the
//! result is pushed to the panel through a [`tessera_display::DisplayBackend`].
//!
//! Two modes, chosen automatically from the transfer buffer size:
//!
//! - **Immediate**: the buffer covers the whole screen, so every command
//!   executes against the live buffer as it is issued and finalize only
//!   pushes bytes out.
//! - **Deferred**: the buffer is smaller than the screen. Commands
//!   accumulate in a queue and finalize replays them once per tile, with
//!   each tile sized to fit the buffer.
//!
//! Both modes produce byte-identical output for the same command sequence.
//!
//! A `Display` is single-threaded and non-reentrant; `&mut self` on every
//! operation makes the caller-serializes-access rule compiler-enforced.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod color;
pub mod command;
pub mod display;
mod fb;
pub mod font;
mod text;

// Re-export key types
pub use color::Rgba;
pub use command::{Command, Settings, MAX_TEXT_LEN};
pub use display::{CfbError, Display};
pub use font::{Font, FontCaps};
