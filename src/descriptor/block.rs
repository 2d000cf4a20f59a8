//! Fixed-capacity descriptor buffers
//!
//! A [`DescriptorBlock`] holds a run of class-specific descriptors, laid out
//! back to back, exactly as they'll appear on the wire. Descriptors are only
//! ever appended through [`DescriptorBlock::descriptor`], which writes
//! `bLength` *after* the fields are written. There's no way to state a
//! descriptor length by hand.

use crate::Error;

/// A run of serialized descriptors.
#[derive(Clone)]
pub struct DescriptorBlock<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> DescriptorBlock<N> {
    /// Create an empty block.
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// The serialized descriptors.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Indicates if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walk the block one descriptor at a time, the same way a host parser
    /// does: by trusting each `bLength`.
    pub fn descriptors(&self) -> Descriptors<'_> {
        Descriptors {
            bytes: self.as_bytes(),
        }
    }

    /// Append a descriptor of type `descriptor_type`.
    ///
    /// `fields` writes everything after `bDescriptorType`. Once it returns,
    /// `bLength` is set from the number of bytes actually written. Returns the
    /// offset of the new descriptor within the block, so that callers can
    /// patch aggregate fields later.
    pub(crate) fn descriptor(
        &mut self,
        descriptor_type: u8,
        fields: impl FnOnce(&mut Fields<'_>) -> Result<(), Error>,
    ) -> Result<usize, Error> {
        let start = self.len;
        let mut writer = Fields {
            bytes: &mut self.bytes,
            len: &mut self.len,
        };
        // Length is a placeholder until the fields are in.
        writer.u8(0)?.u8(descriptor_type)?;
        fields(&mut writer)?;

        let length = u8::try_from(self.len - start).map_err(|_| Error::DescriptorOverflow)?;
        self.bytes[start] = length;
        Ok(start)
    }

    /// Overwrite a little-endian `u16` at `offset`.
    pub(crate) fn patch_u16(&mut self, offset: usize, value: u16) -> Result<(), Error> {
        let end = offset + 2;
        if end > self.len {
            return Err(Error::DescriptorOverflow);
        }
        self.bytes[offset..end].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

impl<const N: usize> Default for DescriptorBlock<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for DescriptorBlock<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.descriptors()).finish()
    }
}

/// Field writer handed to [`DescriptorBlock::descriptor`].
pub(crate) struct Fields<'a> {
    bytes: &'a mut [u8],
    len: &'a mut usize,
}

impl Fields<'_> {
    pub(crate) fn u8(&mut self, value: u8) -> Result<&mut Self, Error> {
        let slot = self
            .bytes
            .get_mut(*self.len)
            .ok_or(Error::DescriptorOverflow)?;
        *slot = value;
        *self.len += 1;
        Ok(self)
    }

    pub(crate) fn u16(&mut self, value: u16) -> Result<&mut Self, Error> {
        let [lo, hi] = value.to_le_bytes();
        self.u8(lo)?.u8(hi)
    }

    /// Three byte little-endian field, like `tSamFreq`.
    pub(crate) fn u24(&mut self, value: u32) -> Result<&mut Self, Error> {
        let [b0, b1, b2, _] = value.to_le_bytes();
        self.u8(b0)?.u8(b1)?.u8(b2)
    }
}

/// Iterator over the descriptors in a [`DescriptorBlock`].
///
/// Stops early if a descriptor's `bLength` is shorter than the two byte
/// header, or runs past the end of the block.
pub struct Descriptors<'a> {
    bytes: &'a [u8],
}

impl<'a> Iterator for Descriptors<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let length = usize::from(*self.bytes.first()?);
        if length < 2 || length > self.bytes.len() {
            self.bytes = &[];
            return None;
        }
        let (descriptor, rest) = self.bytes.split_at(length);
        self.bytes = rest;
        Some(descriptor)
    }
}
