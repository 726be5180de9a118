//! `UsbClass` serving Microsoft OS descriptors through `usb-device`.

use log::{debug, error};
use usb_device::bus::{InterfaceNumber, UsbBus, UsbBusAllocator};
use usb_device::class::{ControlIn, UsbClass};
use usb_device::control::Request;
use usb_device::UsbError;

use crate::config::MsosConfig;
use crate::router::{FeatureIndex, MsosRequest};
use crate::usbdata::{CtrRequestType, SetupPacket};
use crate::{MsosError, MsosResult};

/// Vendor specific interface class.
pub const USB_CLASS_VENDOR_SPEC: u8 = 0xff;

/// `usb-device` control buffer size with `control-buffer-256`.
/// Responses are written there whole, so no descriptor may be longer.
pub const CONTROL_BUFFER_SIZE: usize = 256;

/// Answers the OS string descriptor request and the OS Feature
/// vendor requests of a single-interface device.
///
/// The class owns one vendor specific interface without endpoints,
/// the one the compat ID binds a driver to. It must be created
/// before any other class so that it gets interface number 0.
///
/// Requests it does not recognise are left for other classes and
/// `usb-device`, unknown feature indices end up stalled.
pub struct MsosClass<'a> {
    config: MsosConfig<'a>,
    iface: InterfaceNumber,
}

impl<'a> MsosClass<'a> {
    /// Validate `config` and allocate the interface.
    ///
    /// Fails if some descriptor of `config` could never be served
    /// whole from the control buffer, or if another class already
    /// took interface 0. The device should not be started then.
    pub fn new<B: UsbBus>(alloc: &UsbBusAllocator<B>, config: MsosConfig<'a>) -> MsosResult<Self> {
        config.validate()?;

        for feature in [FeatureIndex::CompatId, FeatureIndex::Properties] {
            let len = config.encoded_len(feature)?;
            if len > CONTROL_BUFFER_SIZE {
                error!(
                    "{:?} descriptor is {} bytes, control buffer holds {}",
                    feature, len, CONTROL_BUFFER_SIZE
                );
                return Err(MsosError::ExceedsControlBuffer);
            }
        }

        let iface = alloc.interface();
        if u8::from(iface) != 0 {
            error!("allocated interface {}, compat id names 0", u8::from(iface));
            return Err(MsosError::InterfaceNotFirst);
        }

        Ok(MsosClass { config, iface })
    }

    /// Configuration the descriptors are encoded from.
    pub fn config(&self) -> &MsosConfig<'a> {
        &self.config
    }

    /// Interface allocated for the device function.
    pub fn interface(&self) -> InterfaceNumber {
        self.iface
    }
}

fn setup_packet(req: &Request) -> SetupPacket {
    let reqt = req.direction as u8 | (req.request_type as u8) << 5 | req.recipient as u8;
    SetupPacket::new(
        CtrRequestType::from(reqt),
        req.request,
        req.value,
        req.index,
        req.length,
    )
}

impl<B: UsbBus> UsbClass<B> for MsosClass<'_> {
    fn get_configuration_descriptors(
        &self,
        writer: &mut usb_device::descriptor::DescriptorWriter,
    ) -> usb_device::Result<()> {
        writer.interface(self.iface, USB_CLASS_VENDOR_SPEC, 0x00, 0x00)
    }

    fn control_in(&mut self, xfer: ControlIn<B>) {
        let setup = setup_packet(xfer.request());

        let Some(req) = MsosRequest::classify(&setup, self.config.vendor_code()) else {
            return;
        };

        let config = self.config;
        let requested = setup.length() as usize;

        let res = xfer.accept(|buf| {
            let len = req.respond(&config, buf, requested).map_err(|err| {
                error!("{:?}: {:?}", req, err);
                match err {
                    MsosError::DescriptorTooLarge => UsbError::BufferOverflow,
                    _ => UsbError::InvalidState,
                }
            })?;
            debug!("{:?}: {} of {} bytes", req, len, requested);
            Ok(len)
        });

        if res.is_err() {
            // left pending, usb-device stalls the request
            debug!("{:?} not answered", req);
        }
    }
}
