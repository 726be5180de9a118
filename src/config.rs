//! Per-device Microsoft OS descriptor configuration.

use log::warn;

use crate::property::{PropertyEntry, DEVICE_INTERFACE_GUID_NAME, SELECTIVE_SUSPEND_NAME};
use crate::router::{EncodedDescriptor, FeatureIndex};
use crate::{MsosError, MsosResult};

/// Vendor request code used when the device has no preference.
pub const DEFAULT_VENDOR_CODE: u8 = b'Q';

/// Compatible ID binding the WinUSB driver.
pub const WINUSB_COMPATIBLE_ID: &str = "WINUSB";

/// Length of the compatible ID field on the wire.
pub const COMPATIBLE_ID_LEN: usize = 8;

/// A `REG_SZ` registry value advertised in the Extended
/// Properties descriptor.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RegistryProperty<'a> {
    /// Registry value name.
    pub name: &'a str,
    /// Registry value.
    pub value: &'a str,
}

/// Microsoft OS descriptor configuration of a device.
///
/// Built once when the device is constructed and never
/// changed afterwards. Every descriptor is encoded from it
/// on demand.
///
/// ```
/// use usbd_msos::prelude::*;
///
/// let config = MsosConfig::new(0x20)
///     .compatible_id("WINUSB")
///     .registry_property("DeviceInterfaceGUID", "{00000000-0000-0000-0000-000000000000}")
///     .selective_suspend(true);
///
/// assert_eq!(config.validate(), Ok(()));
/// assert_eq!(config.properties().count(), 2);
/// ```
#[must_use]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MsosConfig<'a> {
    vendor_code: u8,
    compatible_id: Option<&'a str>,
    registry_property: Option<RegistryProperty<'a>>,
    selective_suspend: bool,
    extra_properties: &'a [PropertyEntry<'a>],
}

impl<'a> MsosConfig<'a> {
    /// Create a configuration advertising nothing but
    /// the vendor request code.
    pub const fn new(vendor_code: u8) -> Self {
        MsosConfig {
            vendor_code,
            compatible_id: None,
            registry_property: None,
            selective_suspend: false,
            extra_properties: &[],
        }
    }

    /// Configuration binding WinUSB and registering the device
    /// under `interface_guid` (in `{xxxxxxxx-...}` form).
    pub const fn winusb(vendor_code: u8, interface_guid: &'a str) -> Self {
        Self::new(vendor_code)
            .compatible_id(WINUSB_COMPATIBLE_ID)
            .registry_property(DEVICE_INTERFACE_GUID_NAME, interface_guid)
    }

    /// Set the compatible ID. ASCII only; anything past
    /// 8 bytes is cut off on the wire.
    pub const fn compatible_id(self, id: &'a str) -> Self {
        MsosConfig {
            compatible_id: Some(id),
            ..self
        }
    }

    /// Set the `REG_SZ` registry property.
    pub const fn registry_property(self, name: &'a str, value: &'a str) -> Self {
        MsosConfig {
            registry_property: Some(RegistryProperty { name, value }),
            ..self
        }
    }

    /// Advertise `SelectiveSuspendEnabled = 1`.
    ///
    /// Signaling remote wakeup in the standard descriptors is not
    /// enough for Windows drivers to actually use selective suspend,
    /// this registry value switches it on.
    pub const fn selective_suspend(self, enabled: bool) -> Self {
        MsosConfig {
            selective_suspend: enabled,
            ..self
        }
    }

    /// Additional properties of any type, emitted after the
    /// registry and selective suspend properties.
    pub const fn extra_properties(self, properties: &'a [PropertyEntry<'a>]) -> Self {
        MsosConfig {
            extra_properties: properties,
            ..self
        }
    }

    /// Vendor request code (`bRequest`) for OS Feature requests.
    pub fn vendor_code(&self) -> u8 {
        self.vendor_code
    }

    /// Configured compatible ID text, as given.
    pub fn compatible_id_str(&self) -> Option<&'a str> {
        self.compatible_id
    }

    /// Compatible ID as it appears on the wire: ASCII,
    /// zero padded, truncated to 8 bytes.
    pub fn compatible_id_field(&self) -> [u8; COMPATIBLE_ID_LEN] {
        let mut field = [0u8; COMPATIBLE_ID_LEN];
        if let Some(id) = self.compatible_id {
            let bytes = id.as_bytes();
            let len = bytes.len().min(COMPATIBLE_ID_LEN);
            field[..len].copy_from_slice(&bytes[..len]);
        }
        field
    }

    /// Registry property, if any.
    pub fn registry(&self) -> Option<RegistryProperty<'a>> {
        self.registry_property
    }

    /// Whether `SelectiveSuspendEnabled` is advertised.
    pub fn selective_suspend_enabled(&self) -> bool {
        self.selective_suspend
    }

    /// Properties in the order they are encoded: registry
    /// property, selective suspend, then the extra properties.
    pub fn properties(&self) -> impl Iterator<Item = PropertyEntry<'a>> + 'a {
        let registry = self
            .registry_property
            .map(|p| PropertyEntry::string(p.name, p.value));
        let suspend = self
            .selective_suspend
            .then(|| PropertyEntry::dword(SELECTIVE_SUSPEND_NAME, 1));
        let extra: &'a [PropertyEntry<'a>] = self.extra_properties;

        registry
            .into_iter()
            .chain(suspend)
            .chain(extra.iter().copied())
    }

    /// Full length of the `feature` descriptor.
    pub fn encoded_len(&self, feature: FeatureIndex) -> MsosResult<usize> {
        Ok(EncodedDescriptor::encode(self, feature)?.len())
    }

    /// Check that every descriptor of this configuration can be
    /// served.
    ///
    /// Errors here are configuration defects. Devices should
    /// call this at construction and refuse to start on error.
    pub fn validate(&self) -> MsosResult<()> {
        if let Some(id) = self.compatible_id {
            if !id.is_ascii() {
                return Err(MsosError::NonAsciiCompatibleId);
            }
            if id.len() > COMPATIBLE_ID_LEN {
                warn!("compatible id {:?} truncated to {} bytes", id, COMPATIBLE_ID_LEN);
            }
        }

        self.encoded_len(FeatureIndex::CompatId)?;
        self.encoded_len(FeatureIndex::Properties)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyData;
    use std::vec::Vec;

    #[test]
    fn test_properties_order() {
        const EXTRA: [PropertyEntry<'static>; 1] =
            [PropertyEntry::new("Extra", PropertyData::DwordBe(2))];

        let config = MsosConfig::new(1)
            .extra_properties(&EXTRA)
            .selective_suspend(true)
            .registry_property("Name", "Value");

        let names: Vec<&str> = config.properties().map(|p| p.name).collect();
        assert_eq!(names, ["Name", SELECTIVE_SUSPEND_NAME, "Extra"]);
    }

    #[test]
    fn test_properties_empty() {
        assert_eq!(MsosConfig::new(1).properties().count(), 0);
        assert_eq!(MsosConfig::new(1).selective_suspend(false).properties().count(), 0);
    }

    #[test]
    fn test_compatible_id_field() {
        assert_eq!(MsosConfig::new(1).compatible_id_field(), [0; 8]);
        assert_eq!(
            MsosConfig::new(1).compatible_id("WINUSB").compatible_id_field(),
            *b"WINUSB\0\0"
        );
        assert_eq!(
            MsosConfig::new(1).compatible_id("12345678").compatible_id_field(),
            *b"12345678"
        );
        assert_eq!(
            MsosConfig::new(1).compatible_id("123456789AB").compatible_id_field(),
            *b"12345678"
        );
    }

    #[test]
    fn test_winusb_preset() {
        let config = MsosConfig::winusb(DEFAULT_VENDOR_CODE, "{guid}");
        assert_eq!(config.vendor_code(), b'Q');
        assert_eq!(config.compatible_id_str(), Some("WINUSB"));
        assert_eq!(
            config.registry(),
            Some(RegistryProperty {
                name: "DeviceInterfaceGUID",
                value: "{guid}"
            })
        );
        assert!(!config.selective_suspend_enabled());
    }

    #[test]
    fn test_validate() {
        crate::init_log();

        assert_eq!(MsosConfig::new(1).validate(), Ok(()));
        assert_eq!(
            MsosConfig::winusb(1, "{85239cd7-da0f-44ea-a9c8-da8cc28f8564}")
                .selective_suspend(true)
                .validate(),
            Ok(())
        );
        assert_eq!(
            MsosConfig::new(1).compatible_id("WINUSBÄ").validate(),
            Err(MsosError::NonAsciiCompatibleId)
        );
    }

    #[test]
    fn test_validate_long_compatible_id() {
        crate::init_log();

        // accepted, only the first 8 bytes go on the wire
        let config = MsosConfig::new(1).compatible_id("WINUSB_EXTRA");
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.compatible_id_field(), *b"WINUSB_E");
        assert_eq!(config.encoded_len(FeatureIndex::CompatId), Ok(40));
    }

    #[test]
    fn test_encoded_len() {
        let config = MsosConfig::new(1).selective_suspend(true);
        assert_eq!(config.encoded_len(FeatureIndex::CompatId), Ok(40));
        assert_eq!(
            config.encoded_len(FeatureIndex::Properties),
            Ok(10 + 14 + (SELECTIVE_SUSPEND_NAME.len() + 1) * 2 + 4)
        );
    }

    #[test]
    fn test_validate_too_large() {
        const BLOB: [u8; 5000] = [0x55; 5000];
        const EXTRA: [PropertyEntry<'static>; 1] =
            [PropertyEntry::new("Blob", PropertyData::Binary(&BLOB))];

        assert_eq!(
            MsosConfig::new(1).extra_properties(&EXTRA).validate(),
            Err(MsosError::DescriptorTooLarge)
        );
    }
}
