//! Bounds-checked, byte-order aware reads over an in-memory file.

use crate::error::{DtaError, Result};
use crate::types::{ByteOrder, DtaVersion};

pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }

    pub(crate) fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub(crate) fn order(&self) -> ByteOrder {
        self.order
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(DtaError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub(crate) fn peek_is(&self, tag: &[u8]) -> bool {
        self.data[self.pos..].starts_with(tag)
    }

    /// Consumes `tag` or fails without moving.
    pub(crate) fn expect(&mut self, tag: &[u8]) -> Result<()> {
        if !self.peek_is(tag) {
            return Err(DtaError::unexpected_tag(tag, self.pos));
        }
        self.pos += tag.len();
        Ok(())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn i8(&mut self) -> Result<i8> {
        Ok(i8::from_ne_bytes([self.u8()?]))
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        let bytes = self.array::<2>()?;
        Ok(match self.order {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        })
    }

    pub(crate) fn i16(&mut self) -> Result<i16> {
        let bytes = self.array::<2>()?;
        Ok(match self.order {
            ByteOrder::Big => i16::from_be_bytes(bytes),
            ByteOrder::Little => i16::from_le_bytes(bytes),
        })
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let bytes = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }

    pub(crate) fn i32(&mut self) -> Result<i32> {
        let bytes = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Big => i32::from_be_bytes(bytes),
            ByteOrder::Little => i32::from_le_bytes(bytes),
        })
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        let bytes = self.array::<8>()?;
        Ok(match self.order {
            ByteOrder::Big => u64::from_be_bytes(bytes),
            ByteOrder::Little => u64::from_le_bytes(bytes),
        })
    }

    /// Reads a strL `(variable, observation)` reference from a data record.
    pub(crate) fn strl_ref(&mut self, version: DtaVersion) -> Result<(u64, u64)> {
        let key = self.u64()?;
        let v_bits = version.strl_variable_bits();
        let o_bits = 64 - v_bits;
        Ok(match self.order {
            ByteOrder::Little => (key & ((1u64 << v_bits) - 1), key >> v_bits),
            ByteOrder::Big => (key >> o_bits, key & ((1u64 << o_bits) - 1)),
        })
    }

    /// Reads a NUL-terminated string padded to `len` bytes.
    pub(crate) fn fixed_str(&mut self, len: usize, version: DtaVersion) -> Result<String> {
        let raw = self.take(len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(decode_text(&raw[..end], version))
    }
}

pub(crate) fn decode_text(bytes: &[u8], version: DtaVersion) -> String {
    if version.is_utf8() {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}
