//! Transport Module
//!
//! The privileged call path that carries frames to the controller.
//!
//! ## Implementations
//! - `IoKitTransport` (macOS): `AppleSMC` user client via IOKit
//! - `SimulatedSmc`: in-memory controller for tests and benchmarks

mod error;
#[cfg(target_os = "macos")]
mod iokit;
mod simulated;

pub use error::TransportError;
#[cfg(target_os = "macos")]
pub use iokit::IoKitTransport;
pub use simulated::SimulatedSmc;

use crate::config::Config;
use crate::protocol::FrameBytes;

/// Generic `kIOReturnError`
pub const IO_RETURN_ERROR: u32 = 0xe000_02bc;

/// `kIOReturnBadArgument`
pub const IO_RETURN_BAD_ARGUMENT: u32 = 0xe000_02c2;

/// A blocking frame-in, frame-out call to the controller
///
/// The handle is acquired when the implementation is constructed and
/// released when it is dropped.
pub trait SmcTransport {
    /// Issue one call at `selector` and return the response frame
    fn call(&mut self, selector: u32, input: &FrameBytes) -> Result<FrameBytes, TransportError>;
}

impl<T: SmcTransport + ?Sized> SmcTransport for Box<T> {
    fn call(&mut self, selector: u32, input: &FrameBytes) -> Result<FrameBytes, TransportError> {
        (**self).call(selector, input)
    }
}

impl<T: SmcTransport + ?Sized> SmcTransport for &mut T {
    fn call(&mut self, selector: u32, input: &FrameBytes) -> Result<FrameBytes, TransportError> {
        (**self).call(selector, input)
    }
}

/// Open the controller transport of this platform
#[cfg(target_os = "macos")]
pub fn open_platform(config: &Config) -> Result<Box<dyn SmcTransport>, TransportError> {
    Ok(Box::new(IoKitTransport::open(&config.service_name)?))
}

/// Open the controller transport of this platform
#[cfg(not(target_os = "macos"))]
pub fn open_platform(config: &Config) -> Result<Box<dyn SmcTransport>, TransportError> {
    tracing::debug!("No transport for service {} on this platform", config.service_name);
    Err(TransportError::Unsupported)
}
