//! Buffered origin responses.

use bytes::{Bytes, BytesMut};

use crate::origin::error::is_sentinel;

/// A full origin response as the ordered chunks it arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginResponse {
    chunks: Vec<Bytes>,
}

impl OriginResponse {
    pub fn from_chunks(chunks: Vec<Bytes>) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The response as one contiguous buffer.
    pub fn to_bytes(&self) -> Bytes {
        match self.chunks.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            chunks => {
                let mut buf = BytesMut::with_capacity(self.len());
                for chunk in chunks {
                    buf.extend_from_slice(chunk);
                }
                buf.freeze()
            }
        }
    }

    /// Whether the content equals a forwarder sentinel payload.
    pub fn is_sentinel(&self) -> bool {
        self.len() <= 64 && is_sentinel(&self.to_bytes())
    }
}

impl From<&'static [u8]> for OriginResponse {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_chunks(vec![Bytes::from_static(bytes)])
    }
}
