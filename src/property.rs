//! Registry property records of the Extended Properties descriptor.
//!
//! Each record is self-describing:
//!
//! | field                 | size |
//! |-----------------------|------|
//! | `dwSize`              | 4    |
//! | `dwPropertyDataType`  | 4    |
//! | `wPropertyNameLength` | 2    |
//! | `bPropertyName`       | var, UTF-16LE, null terminated |
//! | `dwPropertyDataLength`| 4    |
//! | `bPropertyData`       | var  |
//!
//! `dwSize` covers the whole record, so a reader can skip records
//! without understanding their type.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::text::utf16le_len;
use crate::writer::DescriptorWriter;
use crate::{MsosError, MsosResult};

/// Registry value name Windows reads selective suspend support from.
pub const SELECTIVE_SUSPEND_NAME: &str = "SelectiveSuspendEnabled";

/// Registry value name for the device interface GUID WinUSB
/// registers the device under.
pub const DEVICE_INTERFACE_GUID_NAME: &str = "DeviceInterfaceGUID";

/// Fixed part of a record: size, type, name length and data length.
pub const PROPERTY_FIXED_LEN: usize = 4 + 4 + 2 + 4;

/// `dwPropertyDataType` values.
#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum PropertyDataType {
    /// `REG_SZ`, null terminated Unicode string
    Sz = 1,
    /// `REG_EXPAND_SZ`, string with environment variable references
    ExpandSz = 2,
    /// `REG_BINARY`, free-form binary
    Binary = 3,
    /// `REG_DWORD_LITTLE_ENDIAN`
    DwordLe = 4,
    /// `REG_DWORD_BIG_ENDIAN`
    DwordBe = 5,
    /// `REG_LINK`, Unicode symbolic link
    Link = 6,
    /// `REG_MULTI_SZ`, sequence of null terminated strings
    MultiSz = 7,
}

/// Property value together with its registry type.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PropertyData<'a> {
    /// `REG_SZ`
    Sz(&'a str),
    /// `REG_EXPAND_SZ`
    ExpandSz(&'a str),
    /// `REG_BINARY`
    Binary(&'a [u8]),
    /// `REG_DWORD_LITTLE_ENDIAN`
    DwordLe(u32),
    /// `REG_DWORD_BIG_ENDIAN`
    DwordBe(u32),
    /// `REG_LINK`
    Link(&'a str),
    /// `REG_MULTI_SZ`
    MultiSz(&'a [&'a str]),
}

impl PropertyData<'_> {
    /// Registry type of the value.
    pub fn data_type(&self) -> PropertyDataType {
        match self {
            PropertyData::Sz(_) => PropertyDataType::Sz,
            PropertyData::ExpandSz(_) => PropertyDataType::ExpandSz,
            PropertyData::Binary(_) => PropertyDataType::Binary,
            PropertyData::DwordLe(_) => PropertyDataType::DwordLe,
            PropertyData::DwordBe(_) => PropertyDataType::DwordBe,
            PropertyData::Link(_) => PropertyDataType::Link,
            PropertyData::MultiSz(_) => PropertyDataType::MultiSz,
        }
    }

    /// Encoded length of the value, `dwPropertyDataLength`.
    pub fn len(&self) -> usize {
        match self {
            PropertyData::Sz(s) | PropertyData::ExpandSz(s) | PropertyData::Link(s) => {
                utf16le_len(s, true)
            }
            PropertyData::Binary(b) => b.len(),
            PropertyData::DwordLe(_) | PropertyData::DwordBe(_) => 4,
            // extra null closes the list
            PropertyData::MultiSz(list) => {
                list.iter().map(|s| utf16le_len(s, true)).sum::<usize>() + 2
            }
        }
    }

    /// `true` if the value encodes to no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, w: &mut DescriptorWriter<'_>) -> MsosResult<()> {
        match self {
            PropertyData::Sz(s) | PropertyData::ExpandSz(s) | PropertyData::Link(s) => {
                w.utf16(s, true)?;
            }
            PropertyData::Binary(b) => w.write(b)?,
            PropertyData::DwordLe(v) => w.u32(*v)?,
            PropertyData::DwordBe(v) => w.write(&v.to_be_bytes())?,
            PropertyData::MultiSz(list) => {
                for s in list.iter() {
                    w.utf16(s, true)?;
                }
                w.u16(0)?;
            }
        }
        Ok(())
    }
}

/// One named registry value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PropertyEntry<'a> {
    /// Registry value name.
    pub name: &'a str,
    /// Registry value.
    pub data: PropertyData<'a>,
}

impl<'a> PropertyEntry<'a> {
    /// Create a property of any type.
    pub const fn new(name: &'a str, data: PropertyData<'a>) -> Self {
        PropertyEntry { name, data }
    }

    /// Create a `REG_SZ` property.
    pub const fn string(name: &'a str, value: &'a str) -> Self {
        Self::new(name, PropertyData::Sz(value))
    }

    /// Create a `REG_DWORD_LITTLE_ENDIAN` property.
    pub const fn dword(name: &'a str, value: u32) -> Self {
        Self::new(name, PropertyData::DwordLe(value))
    }

    /// Size of the encoded record, `dwSize`.
    pub fn encoded_len(&self) -> usize {
        PROPERTY_FIXED_LEN + utf16le_len(self.name, true) + self.data.len()
    }

    /// Append the record to `w`. Returns the record size.
    pub fn encode(&self, w: &mut DescriptorWriter<'_>) -> MsosResult<usize> {
        let name_len =
            u16::try_from(utf16le_len(self.name, true)).map_err(|_| MsosError::NameTooLong)?;
        let data_len =
            u32::try_from(self.data.len()).map_err(|_| MsosError::DescriptorTooLarge)?;

        w.framed(
            4,
            |b| {
                b.u32(self.data.data_type().into())?;
                b.u16(name_len)?;
                b.utf16(self.name, true)?;
                b.u32(data_len)?;
                self.data.write(b)
            },
            |h, total, ()| {
                let size = u32::try_from(total).map_err(|_| MsosError::DescriptorTooLarge)?;
                h.u32(size)
            },
        )
    }
}
