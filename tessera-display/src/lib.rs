//! Display backend abstraction for the Tessera framebuffer engine
//!
//! This crate provides:
//! - `DisplayBackend` trait that panel drivers implement
//! - `PixelFormat` and `ScreenInfo` describing a panel's pixel encoding
//! - `Capabilities` and `BufferDescriptor` exchanged with the renderer
//!
//! # Architecture
//!
//! Panel drivers (SPI OLEDs, parallel TFTs, simulators) implement
//! `DisplayBackend` with their hardware-specific code. The rendering engine
//! in `tessera-cfb` composites pixel buffers and hands them to the backend
//! through `write`, without caring about the bus underneath.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod format;

// Re-export key types
pub use backend::{BufferDescriptor, Capabilities, DisplayBackend, DisplayError};
pub use format::{PixelFormat, ScreenInfo};
