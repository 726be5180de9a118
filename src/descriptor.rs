//! Builders for the Microsoft OS 1.0 descriptors.
//!
//! Both OS Feature descriptors are composed body first; the
//! header with the total length and the element count is
//! written once the body has been measured.

use log::trace;
use usb_device::descriptor::descriptor_type;

use crate::config::MsosConfig;
use crate::property::PropertyEntry;
use crate::router::FeatureIndex;
use crate::writer::DescriptorWriter;
use crate::{MsosError, MsosResult, MSOS_BCD_VERSION, MSOS_SIGNATURE};

/// Extended Compat ID header: `dwLength`, `bcdVersion`, `wIndex`,
/// `bCount` and 7 reserved bytes.
pub const COMPAT_ID_HEADER_LEN: usize = 16;

/// Extended Compat ID function section.
pub const COMPAT_ID_FUNCTION_LEN: usize = 24;

/// Extended Properties header: `dwLength`, `bcdVersion`, `wIndex`
/// and `wCount`.
pub const PROPERTIES_HEADER_LEN: usize = 10;

/// OS string descriptor length.
pub const OS_STRING_DESC_LEN: usize = 18;

/// Number of UTF-16 units in the OS string descriptor signature.
pub const OS_STRING_SIGNATURE_UNITS: usize = 7;

fn dw_length(total: usize) -> MsosResult<u32> {
    u32::try_from(total).map_err(|_| MsosError::DescriptorTooLarge)
}

/// Append the Extended Compat ID descriptor for `config`.
///
/// Exactly one function section is emitted, for interface 0.
/// Returns the descriptor length.
pub fn compat_id(config: &MsosConfig<'_>, w: &mut DescriptorWriter<'_>) -> MsosResult<usize> {
    let len = w.framed(
        COMPAT_ID_HEADER_LEN,
        |b| {
            // bFirstInterfaceNumber
            b.u8(0)?;
            // reserved, must be 1
            b.u8(0x01)?;
            b.write(&config.compatible_id_field())?;
            // subCompatibleID
            b.zeroes(8)?;
            b.zeroes(6)?;
            Ok(1u8)
        },
        |h, total, count| {
            h.u32(dw_length(total)?)?;
            h.u16(MSOS_BCD_VERSION)?;
            h.u16(FeatureIndex::CompatId.into())?;
            h.u8(count)?;
            h.zeroes(7)
        },
    )?;

    trace!("compat id descriptor: {} bytes", len);
    Ok(len)
}

/// Append an Extended Properties descriptor holding `entries`,
/// in iteration order. Returns the descriptor length.
pub fn properties<'p>(
    entries: impl IntoIterator<Item = PropertyEntry<'p>>,
    w: &mut DescriptorWriter<'_>,
) -> MsosResult<usize> {
    let len = w.framed(
        PROPERTIES_HEADER_LEN,
        |b| {
            let mut count: u16 = 0;
            for entry in entries {
                entry.encode(b)?;
                count = count.checked_add(1).ok_or(MsosError::DescriptorTooLarge)?;
            }
            Ok(count)
        },
        |h, total, count| {
            h.u32(dw_length(total)?)?;
            h.u16(MSOS_BCD_VERSION)?;
            h.u16(FeatureIndex::Properties.into())?;
            h.u16(count)
        },
    )?;

    trace!("properties descriptor: {} bytes", len);
    Ok(len)
}

/// Append the Extended Properties descriptor for `config`.
pub fn config_properties(
    config: &MsosConfig<'_>,
    w: &mut DescriptorWriter<'_>,
) -> MsosResult<usize> {
    properties(config.properties(), w)
}

/// Build an OS string descriptor from a 7 unit `signature`.
pub fn os_string(signature: &str, vendor_code: u8) -> MsosResult<[u8; OS_STRING_DESC_LEN]> {
    if signature.encode_utf16().count() != OS_STRING_SIGNATURE_UNITS {
        return Err(MsosError::InvalidSignatureLength);
    }

    let mut desc = [0u8; OS_STRING_DESC_LEN];
    let mut w = DescriptorWriter::new(&mut desc);
    w.u8(OS_STRING_DESC_LEN as u8)?;
    w.u8(descriptor_type::STRING)?;
    w.utf16(signature, false)?;
    w.u8(vendor_code)?;
    // bPad
    w.u8(0)?;

    Ok(desc)
}

/// The `MSFT100` OS string descriptor served at string index `0xEE`.
///
/// Vendor code is 0 if the device has no OS descriptor configuration.
pub fn os_string_descriptor(config: Option<&MsosConfig<'_>>) -> MsosResult<[u8; OS_STRING_DESC_LEN]> {
    os_string(MSOS_SIGNATURE, config.map_or(0, |c| c.vendor_code()))
}
