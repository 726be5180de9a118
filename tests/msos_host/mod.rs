//! Host-side view of the Microsoft OS descriptors: parses what
//! the device returned the way Windows walks it, by length
//! fields and counts only.
#![allow(dead_code)]

use usbd_class_tester::prelude::*;

pub struct CompatId {
    pub count: u8,
    pub first_interface: u8,
    pub compatible_id: String,
    pub sub_compatible_id: [u8; 8],
}

pub struct Property {
    pub data_type: u32,
    pub name: String,
    pub data: Vec<u8>,
}

impl Property {
    pub fn string(&self) -> AnyResult<String> {
        let s = utf16z(&self.data)?;
        Ok(s)
    }

    pub fn dword(&self) -> AnyResult<u32> {
        let res = self
            .data
            .as_slice()
            .try_into()
            .map_err(|_| AnyUsbError::DataConversion)?;
        Ok(u32::from_le_bytes(res))
    }
}

fn le16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Decode a null terminated UTF-16LE string that fills `data`.
fn utf16z(data: &[u8]) -> AnyResult<String> {
    if data.len() % 2 != 0 {
        return Err(AnyUsbError::InvalidStringLength);
    }

    let vu16: Vec<u16> = data
        .chunks(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    match vu16.split_last() {
        Some((&0, text)) => String::from_utf16(text).map_err(|_| AnyUsbError::DataConversion),
        _ => Err(AnyUsbError::InvalidStringLength),
    }
}

fn check_header(desc: &[u8], header_len: usize, index: u16) -> AnyResult<()> {
    if desc.len() < header_len || le32(desc) as usize != desc.len() {
        return Err(AnyUsbError::InvalidDescriptorLength);
    }
    if le16(&desc[4..]) != 0x0100 || le16(&desc[6..]) != index {
        return Err(AnyUsbError::InvalidDescriptorType);
    }
    Ok(())
}

pub fn parse_compat_id(desc: &[u8]) -> AnyResult<CompatId> {
    check_header(desc, 16, 4)?;

    let count = desc[8];
    if desc.len() != 16 + 24 * count as usize || count == 0 {
        return Err(AnyUsbError::InvalidDescriptorLength);
    }

    let func = &desc[16..40];
    let id: Vec<u8> = func[2..10].iter().copied().take_while(|b| *b != 0).collect();

    Ok(CompatId {
        count,
        first_interface: func[0],
        compatible_id: String::from_utf8(id).map_err(|_| AnyUsbError::DataConversion)?,
        sub_compatible_id: <[u8; 8]>::try_from(&func[10..18])
            .map_err(|_| AnyUsbError::DataConversion)?,
    })
}

pub fn parse_properties(desc: &[u8]) -> AnyResult<Vec<Property>> {
    check_header(desc, 10, 5)?;

    let count = le16(&desc[8..]) as usize;
    let mut recs = &desc[10..];
    let mut res = Vec::new();

    for _ in 0..count {
        if recs.len() < 14 {
            return Err(AnyUsbError::InvalidDescriptorLength);
        }
        let len = le32(recs) as usize;
        if len < 14 || len > recs.len() {
            return Err(AnyUsbError::InvalidDescriptorLength);
        }
        let (rec, rest) = recs.split_at(len);

        let name_len = le16(&rec[8..]) as usize;
        if 10 + name_len + 4 > len {
            return Err(AnyUsbError::InvalidDescriptorLength);
        }
        let name = utf16z(&rec[10..10 + name_len])?;

        let data_off = 10 + name_len + 4;
        let data_len = le32(&rec[10 + name_len..]) as usize;
        if data_off + data_len != len {
            return Err(AnyUsbError::InvalidDescriptorLength);
        }

        res.push(Property {
            data_type: le32(&rec[4..]),
            name,
            data: rec[data_off..].to_vec(),
        });
        recs = rest;
    }

    if !recs.is_empty() {
        return Err(AnyUsbError::InvalidDescriptorLength);
    }

    Ok(res)
}
