//! A bounded little-endian writer for descriptor composition.

use crate::text::encode_utf16le;
use crate::{MsosError, MsosResult};

/// Cursor over a caller-provided buffer. Every write checks the
/// remaining capacity and fails with `DescriptorTooLarge` instead
/// of writing past the end.
pub struct DescriptorWriter<'a> {
    buf: &'a mut [u8],
    position: usize,
}

impl<'a> DescriptorWriter<'a> {
    /// Create a writer starting at the beginning of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        DescriptorWriter { buf, position: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes that can still be written.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    fn reserve(&mut self, len: usize) -> MsosResult<&mut [u8]> {
        if len > self.remaining() {
            return Err(MsosError::DescriptorTooLarge);
        }
        let start = self.position;
        self.position += len;
        Ok(&mut self.buf[start..start + len])
    }

    /// Write raw bytes.
    pub fn write(&mut self, data: &[u8]) -> MsosResult<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Write `len` zero bytes.
    pub fn zeroes(&mut self, len: usize) -> MsosResult<()> {
        self.reserve(len)?.fill(0);
        Ok(())
    }

    /// Write a byte.
    pub fn u8(&mut self, val: u8) -> MsosResult<()> {
        self.write(&[val])
    }

    /// Write a little-endian `u16`.
    pub fn u16(&mut self, val: u16) -> MsosResult<()> {
        self.write(&val.to_le_bytes())
    }

    /// Write a little-endian `u32`.
    pub fn u32(&mut self, val: u32) -> MsosResult<()> {
        self.write(&val.to_le_bytes())
    }

    /// Write `text` as UTF-16LE, see `text::encode_utf16le`.
    /// Returns the number of bytes written.
    pub fn utf16(&mut self, text: &str, terminated: bool) -> MsosResult<usize> {
        let len = encode_utf16le(text, terminated, &mut self.buf[self.position..])?;
        self.position += len;
        Ok(len)
    }

    /// Compose a length-prefixed structure in two phases.
    ///
    /// `header_len` bytes are set aside, `body` is written after them,
    /// then `header` is called with the total length (header included)
    /// and whatever `body` returned. `header` must write exactly
    /// `header_len` bytes.
    ///
    /// Returns the total length.
    pub fn framed<T>(
        &mut self,
        header_len: usize,
        body: impl FnOnce(&mut DescriptorWriter<'_>) -> MsosResult<T>,
        header: impl FnOnce(&mut DescriptorWriter<'_>, usize, T) -> MsosResult<()>,
    ) -> MsosResult<usize> {
        if header_len > self.remaining() {
            return Err(MsosError::DescriptorTooLarge);
        }

        let (head, tail) = self.buf[self.position..].split_at_mut(header_len);

        let mut bw = DescriptorWriter::new(tail);
        let res = body(&mut bw)?;
        let total = header_len + bw.position();

        let mut hw = DescriptorWriter::new(head);
        header(&mut hw, total, res)?;
        debug_assert_eq!(hw.position(), header_len, "short header");

        self.position += total;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_le_fields() {
        let mut buf = [0u8; 16];
        let mut w = DescriptorWriter::new(&mut buf);

        w.u8(0x12).expect("u8");
        w.u16(0x3456).expect("u16");
        w.u32(0x789a_bcde).expect("u32");
        w.zeroes(2).expect("zeroes");
        w.write(&[1, 2]).expect("write");

        assert_eq!(w.position(), 11);
        assert_eq!(w.remaining(), 5);
        assert_eq!(buf[..11], [0x12, 0x56, 0x34, 0xde, 0xbc, 0x9a, 0x78, 0, 0, 1, 2]);
    }

    #[test]
    fn test_write_overflow() {
        let mut buf = [0u8; 3];
        let mut w = DescriptorWriter::new(&mut buf);

        w.u16(1).expect("u16");
        assert_eq!(w.u16(2), Err(MsosError::DescriptorTooLarge));
        assert_eq!(w.position(), 2);
        assert_eq!(w.utf16("A", true), Err(MsosError::DescriptorTooLarge));
        w.u8(3).expect("u8");
        assert_eq!(w.remaining(), 0);
    }

    #[test]
    fn test_framed_header_after_body() {
        let mut buf = [0xffu8; 16];
        let mut w = DescriptorWriter::new(&mut buf);
        w.u8(0xaa).expect("prefix");

        let total = w
            .framed(
                2,
                |b| {
                    b.write(&[1, 2, 3])?;
                    Ok(3u8)
                },
                |h, total, count| {
                    h.u8(total as u8)?;
                    h.u8(count)
                },
            )
            .expect("framed");

        assert_eq!(total, 5);
        assert_eq!(w.position(), 6);
        assert_eq!(buf[..7], [0xaa, 5, 3, 1, 2, 3, 0xff]);
    }

    #[test]
    fn test_framed_no_room_for_header() {
        let mut buf = [0u8; 1];
        let mut w = DescriptorWriter::new(&mut buf);
        let res = w.framed(2, |_| Ok(()), |h, _, _| h.u16(0));
        assert_eq!(res, Err(MsosError::DescriptorTooLarge));
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_framed_body_overflow() {
        let mut buf = [0u8; 4];
        let mut w = DescriptorWriter::new(&mut buf);
        let res = w.framed(2, |b| b.u32(0), |h, _, _| h.u16(0));
        assert_eq!(res, Err(MsosError::DescriptorTooLarge));
        assert_eq!(w.position(), 0);
    }
}
