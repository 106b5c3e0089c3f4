//! IOKit transport
//!
//! Opens a user-client connection to the `AppleSMC` service and issues
//! struct-in/struct-out method calls on it.

use std::ffi::CString;

use libc::{c_char, c_int, c_uint, c_void, size_t};

use super::{SmcTransport, TransportError, IO_RETURN_BAD_ARGUMENT};
use crate::protocol::{FrameBytes, FRAME_SIZE};

type KernReturn = c_int;
type MachPort = c_uint;
type IoObject = MachPort;
type IoConnect = MachPort;

const KERN_SUCCESS: KernReturn = 0;
const MACH_PORT_NULL: MachPort = 0;

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOServiceMatching(name: *const c_char) -> *mut c_void;
    fn IOServiceGetMatchingServices(
        main_port: MachPort,
        matching: *mut c_void,
        existing: *mut IoObject,
    ) -> KernReturn;
    fn IOIteratorNext(iterator: IoObject) -> IoObject;
    fn IOObjectRelease(object: IoObject) -> KernReturn;
    fn IOServiceOpen(
        service: IoObject,
        owning_task: MachPort,
        connect_type: u32,
        connect: *mut IoConnect,
    ) -> KernReturn;
    fn IOServiceClose(connect: IoConnect) -> KernReturn;
    fn IOConnectCallStructMethod(
        connection: IoConnect,
        selector: u32,
        input: *const c_void,
        input_size: size_t,
        output: *mut c_void,
        output_size: *mut size_t,
    ) -> KernReturn;
}

extern "C" {
    static mach_task_self_: MachPort;
}

fn check(call: &'static str, code: KernReturn) -> Result<(), TransportError> {
    if code == KERN_SUCCESS {
        Ok(())
    } else {
        Err(TransportError::Kernel {
            call,
            code: code as u32,
        })
    }
}

/// A connection to the SMC user client
///
/// The connection is closed by [`IoKitTransport::close`] or on drop.
pub struct IoKitTransport {
    connection: Option<IoConnect>,
}

impl IoKitTransport {
    /// Match the named service and open a connection to its first instance
    pub fn open(service_name: &str) -> Result<Self, TransportError> {
        let name = CString::new(service_name)
            .map_err(|_| TransportError::ServiceNotFound(service_name.to_string()))?;

        // SAFETY: every out-pointer refers to a live local and every object
        // obtained here is released before returning.
        unsafe {
            let matching = IOServiceMatching(name.as_ptr());
            if matching.is_null() {
                return Err(TransportError::ServiceNotFound(service_name.to_string()));
            }

            // Consumes the matching dictionary.
            let mut iterator: IoObject = 0;
            check(
                "IOServiceGetMatchingServices",
                IOServiceGetMatchingServices(MACH_PORT_NULL, matching, &mut iterator),
            )?;

            let device = IOIteratorNext(iterator);
            IOObjectRelease(iterator);
            if device == 0 {
                return Err(TransportError::ServiceNotFound(service_name.to_string()));
            }

            let mut connection: IoConnect = 0;
            let result = IOServiceOpen(device, mach_task_self_, 0, &mut connection);
            IOObjectRelease(device);
            check("IOServiceOpen", result)?;

            tracing::debug!("Opened {} connection {:#x}", service_name, connection);
            Ok(Self {
                connection: Some(connection),
            })
        }
    }

    /// Close the connection
    pub fn close(mut self) -> Result<(), TransportError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), TransportError> {
        match self.connection.take() {
            Some(connection) => {
                tracing::debug!("Closing SMC connection {:#x}", connection);
                // SAFETY: the connection was opened by IOServiceOpen and is
                // closed at most once.
                check("IOServiceClose", unsafe { IOServiceClose(connection) })
            }
            None => Ok(()),
        }
    }
}

impl SmcTransport for IoKitTransport {
    fn call(&mut self, selector: u32, input: &FrameBytes) -> Result<FrameBytes, TransportError> {
        let connection = self.connection.ok_or(TransportError::Kernel {
            call: "IOConnectCallStructMethod",
            code: IO_RETURN_BAD_ARGUMENT,
        })?;

        let mut output = [0u8; FRAME_SIZE];
        let mut output_size: size_t = FRAME_SIZE;

        // SAFETY: input and output are FRAME_SIZE-byte buffers that outlive the
        // call; the kernel writes at most output_size bytes.
        let result = unsafe {
            IOConnectCallStructMethod(
                connection,
                selector,
                input.as_ptr() as *const c_void,
                FRAME_SIZE,
                output.as_mut_ptr() as *mut c_void,
                &mut output_size,
            )
        };
        check("IOConnectCallStructMethod", result)?;

        Ok(output)
    }
}

impl Drop for IoKitTransport {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("Failed to close SMC connection: {}", e);
        }
    }
}
