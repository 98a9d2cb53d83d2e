mod gzip;

pub use gzip::{decompress, is_gzip, DEFAULT_MAX_DECOMPRESSED_BYTES};

const MAX_VARINT_LEN: usize = 10;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ReadError {
    #[error("unexpected end of buffer at offset {offset} while reading {what}")]
    UnexpectedEof { offset: usize, what: &'static str },
    #[error("varint at offset {offset} overflows 64 bits")]
    VarintOverflow { offset: usize },
    #[error("length prefix {len} at offset {offset} exceeds the {remaining} remaining bytes")]
    LengthOutOfRange {
        offset: usize,
        len: u64,
        remaining: usize,
    },
    #[error("failed to decompress gzip: {0}")]
    Decompress(String),
    #[error("decompressed payload exceeds limit of {limit} bytes")]
    DecompressedTooLarge { limit: usize },
}

/// Forward-only cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads an unsigned LEB128 varint, the encoding Go's `binary.Uvarint` uses.
    pub fn read_uvarint(&mut self) -> Result<u64, ReadError> {
        let start = self.pos;
        let mut value: u64 = 0;

        for i in 0..MAX_VARINT_LEN {
            let byte = *self.buf.get(self.pos).ok_or(ReadError::UnexpectedEof {
                offset: self.pos,
                what: "varint",
            })?;
            self.pos += 1;

            // the tenth byte may only contribute the single remaining bit
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(ReadError::VarintOverflow { offset: start });
            }

            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }

        Err(ReadError::VarintOverflow { offset: start })
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        if len > self.remaining() {
            return Err(ReadError::LengthOutOfRange {
                offset: self.pos,
                len: len as u64,
                remaining: self.remaining(),
            });
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a varint length followed by that many bytes.
    pub fn read_prefixed(&mut self) -> Result<&'a [u8], ReadError> {
        let offset = self.pos;
        let len = self.read_uvarint()?;

        if len > self.remaining() as u64 {
            return Err(ReadError::LengthOutOfRange {
                offset,
                len,
                remaining: self.remaining(),
            });
        }

        self.read_bytes(len as usize)
    }
}

/// Appends `value` as an unsigned LEB128 varint.
pub fn write_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uvarint() {
        let mut buf = Vec::new();
        for v in [0u64, 1, 127, 128, 300, 16_384, u32::MAX as u64, u64::MAX] {
            write_uvarint(&mut buf, v);
        }

        let mut r = ByteReader::new(&buf);
        assert_eq!(r.read_uvarint(), Ok(0));
        assert_eq!(r.read_uvarint(), Ok(1));
        assert_eq!(r.read_uvarint(), Ok(127));
        assert_eq!(r.read_uvarint(), Ok(128));
        assert_eq!(r.read_uvarint(), Ok(300));
        assert_eq!(r.read_uvarint(), Ok(16_384));
        assert_eq!(r.read_uvarint(), Ok(u32::MAX as u64));
        assert_eq!(r.read_uvarint(), Ok(u64::MAX));
        assert!(r.is_empty());
    }

    #[test]
    fn test_known_encoding() {
        let mut r = ByteReader::new(&[0xac, 0x02]);
        assert_eq!(r.read_uvarint(), Ok(300));
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn test_truncated_varint() {
        let mut r = ByteReader::new(&[0x80, 0x80]);
        assert_eq!(
            r.read_uvarint(),
            Err(ReadError::UnexpectedEof {
                offset: 2,
                what: "varint"
            })
        );
    }

    #[test]
    fn test_varint_overflow() {
        let mut r = ByteReader::new(&[0xff; 11]);
        assert_eq!(r.read_uvarint(), Err(ReadError::VarintOverflow { offset: 0 }));

        let mut r = ByteReader::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02]);
        assert_eq!(r.read_uvarint(), Err(ReadError::VarintOverflow { offset: 0 }));
    }

    #[test]
    fn test_read_prefixed() {
        let mut r = ByteReader::new(&[3, b'f', b'o', b'o', 0]);
        assert_eq!(r.read_prefixed(), Ok(&b"foo"[..]));
        assert_eq!(r.read_prefixed(), Ok(&b""[..]));
        assert!(r.is_empty());
    }

    #[test]
    fn test_prefix_exceeds_remaining() {
        let mut r = ByteReader::new(&[5, b'a', b'b']);
        assert_eq!(
            r.read_prefixed(),
            Err(ReadError::LengthOutOfRange {
                offset: 0,
                len: 5,
                remaining: 2
            })
        );
    }
}
