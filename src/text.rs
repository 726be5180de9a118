//! UTF-16LE text encoding used by every Microsoft OS descriptor.
//!
//! Code units are written as they come out of `str::encode_utf16`,
//! two bytes each, low byte first. No surrogate validation is done.

use crate::{MsosError, MsosResult};

/// Number of bytes `text` takes when encoded, including the
/// terminating `0x0000` unit if `terminated` is set.
pub fn utf16le_len(text: &str, terminated: bool) -> usize {
    let units = text.encode_utf16().count() + usize::from(terminated);
    units * 2
}

/// Encode `text` into `dest` as UTF-16LE, optionally followed by a
/// null terminator.
///
/// Returns the number of bytes written, `2 * (units + 1)` for
/// a terminated string. Nothing is written if `dest` is too small.
pub fn encode_utf16le(text: &str, terminated: bool, dest: &mut [u8]) -> MsosResult<usize> {
    let len = utf16le_len(text, terminated);
    if len > dest.len() {
        return Err(MsosError::DescriptorTooLarge);
    }

    let units = text
        .encode_utf16()
        .chain(core::iter::once(0).filter(|_| terminated));

    for (chunk, unit) in dest.chunks_exact_mut(2).zip(units) {
        chunk.copy_from_slice(&unit.to_le_bytes());
    }

    Ok(len)
}
