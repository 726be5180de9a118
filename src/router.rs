//! Decides, per control request, which Microsoft OS descriptor
//! to produce and how much of it goes back to the host.

use log::{debug, trace};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use usb_device::control::Request;
use usb_device::descriptor::descriptor_type;

use crate::config::MsosConfig;
use crate::descriptor::{compat_id, config_properties, os_string_descriptor};
use crate::usbdata::{CtrRequestType, SetupPacket};
use crate::writer::DescriptorWriter;
use crate::{MsosResult, MSOS_DESC_INDEX, SCRATCH_SIZE};

/// OS Feature descriptor selector, sent in `wIndex`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum FeatureIndex {
    /// Extended Compat ID descriptor
    CompatId = 4,
    /// Extended Properties descriptor
    Properties = 5,
}

/// A descriptor composed in a request-scoped scratch buffer.
pub struct EncodedDescriptor {
    buf: [u8; SCRATCH_SIZE],
    len: usize,
}

impl EncodedDescriptor {
    /// Encode the `feature` descriptor of `config`.
    pub fn encode(config: &MsosConfig<'_>, feature: FeatureIndex) -> MsosResult<Self> {
        let mut buf = [0u8; SCRATCH_SIZE];
        let mut w = DescriptorWriter::new(&mut buf);

        let len = match feature {
            FeatureIndex::CompatId => compat_id(config, &mut w)?,
            FeatureIndex::Properties => config_properties(config, &mut w)?,
        };

        Ok(EncodedDescriptor { buf, len })
    }

    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Full length of the descriptor.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if nothing was encoded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy as much of the descriptor as `requested_length` and
    /// `dest` allow. Returns the number of bytes copied.
    pub fn copy_to(&self, dest: &mut [u8], requested_length: usize) -> usize {
        let len = self.len.min(requested_length).min(dest.len());
        dest[..len].copy_from_slice(&self.buf[..len]);
        len
    }
}

/// Produce the OS Feature descriptor selected by `feature_index`
/// into `dest`, truncated to `requested_length`.
///
/// Returns the number of bytes produced. An unknown feature index
/// produces nothing and is not an error. Truncation is silent: the
/// host reads the length field and asks again with a larger buffer.
pub fn route(
    config: &MsosConfig<'_>,
    feature_index: u16,
    dest: &mut [u8],
    requested_length: usize,
) -> MsosResult<usize> {
    let feature = match FeatureIndex::try_from(feature_index) {
        Ok(feature) => feature,
        Err(_) => {
            debug!("no OS feature descriptor at index {:#06x}", feature_index);
            return Ok(0);
        }
    };

    let desc = EncodedDescriptor::encode(config, feature)?;
    let len = desc.copy_to(dest, requested_length);

    trace!(
        "{:?}: {} of {} bytes (requested {})",
        feature,
        len,
        desc.len(),
        requested_length
    );

    Ok(len)
}

/// A control request this crate answers.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MsosRequest {
    /// `GET_DESCRIPTOR` for the OS string descriptor at index `0xEE`.
    OsString,
    /// Vendor request for an OS Feature descriptor.
    Feature(FeatureIndex),
}

impl MsosRequest {
    /// Classify a SETUP packet for a device using `vendor_code`.
    ///
    /// Feature requests are accepted with Device (`0xC0`) and
    /// Interface (`0xC1`) recipients, hosts use both.
    ///
    /// `None` means the request is not ours, the caller's fallback
    /// applies (normally a stall).
    pub fn classify(setup: &SetupPacket, vendor_code: u8) -> Option<MsosRequest> {
        let reqt = setup.request_type();

        if reqt == CtrRequestType::to_host().standard().device()
            && setup.request() == Request::GET_DESCRIPTOR
        {
            let (dtype, dindex) = setup.descriptor_type_index();
            if dtype == descriptor_type::STRING && dindex == MSOS_DESC_INDEX {
                return Some(MsosRequest::OsString);
            }
            return None;
        }

        let vendor = CtrRequestType::to_host().vendor();
        if reqt != vendor.device() && reqt != vendor.interface() {
            return None;
        }

        if setup.request() != vendor_code {
            return None;
        }

        match FeatureIndex::try_from(setup.index()) {
            Ok(feature) => Some(MsosRequest::Feature(feature)),
            Err(_) => {
                debug!("unknown OS feature index {:#06x}", setup.index());
                None
            }
        }
    }

    /// Write the response to `out`, at most `requested_length` bytes.
    pub fn respond(
        &self,
        config: &MsosConfig<'_>,
        out: &mut [u8],
        requested_length: usize,
    ) -> MsosResult<usize> {
        match self {
            MsosRequest::OsString => {
                let desc = os_string_descriptor(Some(config))?;
                let len = desc.len().min(requested_length).min(out.len());
                out[..len].copy_from_slice(&desc[..len]);
                Ok(len)
            }
            MsosRequest::Feature(feature) => {
                route(config, (*feature).into(), out, requested_length)
            }
        }
    }
}

/// Answer a raw SETUP packet.
///
/// Returns `Ok(None)` if the request is not an OS descriptor
/// request, otherwise the number of bytes written to `out`.
pub fn handle_control(
    config: &MsosConfig<'_>,
    setup: &SetupPacket,
    out: &mut [u8],
) -> MsosResult<Option<usize>> {
    let Some(req) = MsosRequest::classify(setup, config.vendor_code()) else {
        return Ok(None);
    };

    let len = req.respond(config, out, setup.length() as usize)?;
    debug!("{:?}: {} bytes", req, len);
    Ok(Some(len))
}
