//! LEB128 (Little-Endian Base 128) variable-length integers.
//!
//! Every number in the debug data is stored this way: absolute values as
//! unsigned LEB128, deltas as signed LEB128.

/// Appends `value` to `buf` as unsigned LEB128.
pub fn write_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Appends `value` to `buf` as signed LEB128.
pub fn write_sleb128(buf: &mut Vec<u8>, mut value: i64) {
    loop {
        let byte = (value & 0x7f) as u8;
        // arithmetic shift, keeps the sign
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Appends an optional id, using `0` for `None` and `id + 1` otherwise.
pub fn write_optional(buf: &mut Vec<u8>, value: Option<u32>) {
    write_uleb128(buf, value.map_or(0, |v| u64::from(v) + 1));
}

/// A cursor over a byte slice that decodes LEB128 numbers.
///
/// Decoding never panics: a truncated or oversized number yields `None`, and
/// the caller treats the remainder of the stream as absent.
#[derive(Debug, Clone)]
pub struct Reader<'data> {
    data: &'data [u8],
    pos: usize,
}

impl<'data> Reader<'data> {
    /// Creates a reader positioned at `pos` within `data`.
    pub fn new(data: &'data [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// The current position within the underlying slice.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether the cursor reached the end of the data.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads an unsigned LEB128 value.
    pub fn read_uleb128(&mut self) -> Option<u64> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = *self.data.get(self.pos)?;
            self.pos += 1;
            if shift >= 64 {
                return None;
            }
            let value = u64::from(byte & 0x7f);
            if shift > 0 && value > (u64::MAX >> shift) {
                return None;
            }
            result |= value << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                return Some(result);
            }
        }
    }

    /// Reads a signed LEB128 value.
    pub fn read_sleb128(&mut self) -> Option<i64> {
        let mut result: i64 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = *self.data.get(self.pos)?;
            self.pos += 1;
            if shift >= 64 {
                return None;
            }
            result |= i64::from(byte & 0x7f) << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    result |= !0i64 << shift;
                }
                return Some(result);
            }
        }
    }

    /// Reads an unsigned LEB128 value that must fit into a `u32`.
    pub fn read_u32(&mut self) -> Option<u32> {
        use std::convert::TryFrom;
        self.read_uleb128().and_then(|v| u32::try_from(v).ok())
    }

    /// Reads an optional id written by [`write_optional`].
    pub fn read_optional(&mut self) -> Option<Option<u32>> {
        use std::convert::TryFrom;
        match self.read_uleb128()? {
            0 => Some(None),
            v => u32::try_from(v - 1).ok().map(Some),
        }
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Option<&'data [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }
}
