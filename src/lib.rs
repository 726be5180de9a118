#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
//!
//! Microsoft OS 1.0 descriptors for USB devices built on
//! `usb-device`, or for any emulated device that can hand
//! over raw SETUP packets.
//!
//! ## About
//!
//! Windows probes every new device for a string descriptor at
//! index `0xEE`. If the device answers with the `MSFT100`
//! signature, Windows learns a vendor request code and uses it
//! to fetch "OS Feature" descriptors:
//!
//! * Extended Compat ID (feature index 4), which binds a driver
//!   such as `WINUSB` without a custom INF file,
//! * Extended Properties (feature index 5), which carries registry
//!   entries for the device's `Device Parameters` key.
//!
//! This crate encodes those descriptors byte-exactly and decides,
//! per control request, which one to return and how much of it
//! fits in the host's buffer.
//!
//! Windows caches what it got in the registry. When changing the
//! descriptors, delete `HKLM\SYSTEM\CurrentControlSet\Control\usbflags`
//! and the device's `Enum\USB` subtree to make Windows ask again.
//!
//! ### Not supported
//!
//! * Microsoft OS 2.0 (BOS platform capability) descriptors
//! * Composite devices with more than one compat ID function
//!
//! ## License
//!
//! This project is licensed under [MIT License](https://opensource.org/licenses/MIT).
//!
//! ## Example
//!
//! ```
//! use usb_device::class_prelude::*;
//! use usbd_msos::prelude::*;
//!
//! fn make_class<B: UsbBus>(alloc: &UsbBusAllocator<B>) -> MsosResult<MsosClass<'static>> {
//!     let config = MsosConfig::winusb(
//!         DEFAULT_VENDOR_CODE,
//!         "{85239cd7-da0f-44ea-a9c8-da8cc28f8564}",
//!     )
//!     .selective_suspend(true);
//!
//!     MsosClass::new(alloc, config)
//! }
//! ```
//!
//! Without `usb-device`, raw SETUP packets can be answered with
//! [`router::handle_control`].
//!
//! Debug logging goes through the `log` facade. Tests print it with:
//! `$ RUST_LOG=trace cargo test -- --nocapture`
//!

pub mod class;
pub mod config;
pub mod descriptor;
pub mod property;
pub mod router;
pub mod text;
pub mod usbdata;
pub mod writer;

/// Prelude
pub mod prelude {
    pub use crate::class::MsosClass;
    pub use crate::config::{MsosConfig, RegistryProperty, DEFAULT_VENDOR_CODE};
    pub use crate::property::{PropertyData, PropertyDataType, PropertyEntry};
    pub use crate::router::{route, EncodedDescriptor, FeatureIndex, MsosRequest};
    pub use crate::usbdata::{CtrRequestType, SetupPacket};
    pub use crate::{MsosError, MsosResult};
}

/// String descriptor index Windows reads the OS string descriptor from.
pub const MSOS_DESC_INDEX: u8 = 0xee;

/// Signature carried by the OS string descriptor.
pub const MSOS_SIGNATURE: &str = "MSFT100";

/// Size of the per-request buffer descriptors are composed in.
pub const SCRATCH_SIZE: usize = 4096;

/// `bcdVersion` of both OS Feature descriptors (1.00).
pub const MSOS_BCD_VERSION: u16 = 0x0100;

/// Possible errors. All of them are configuration defects:
/// the descriptors are a pure function of `MsosConfig`, so an
/// error means the configuration can never be served.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MsosError {
    /// Encoded descriptor does not fit in the destination
    /// buffer (normally the scratch buffer).
    DescriptorTooLarge,
    /// OS string descriptor signature is not exactly
    /// 7 characters.
    InvalidSignatureLength,
    /// Compatible ID contains non-ASCII bytes.
    NonAsciiCompatibleId,
    /// Property name is longer than a `u16` byte length
    /// can describe.
    NameTooLong,
    /// Encoded descriptor is longer than the `usb-device`
    /// control buffer, the host would never get all of it.
    ExceedsControlBuffer,
    /// Interface allocated for the class is not interface 0,
    /// the one the compat ID function names.
    InterfaceNotFirst,
}

/// Result for crate operations.
pub type MsosResult<T> = core::result::Result<T, MsosError>;

#[cfg(test)]
pub(crate) fn init_log() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .format_target(false)
        .format_timestamp(None)
        .try_init();
}
