//! Gzip encoding of append payloads.

use std::io::{self, Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Suffix appended to object names holding gzip-encoded content.
pub const GZIP_SUFFIX: &str = ".gz";

/// Content encoding recorded on gzip-encoded objects.
pub const GZIP_ENCODING: &str = "gzip";

/// Gzip-encode `data` in memory.
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decode gzip content.
///
/// Appended objects are a concatenation of gzip members, one per append,
/// so every member is decoded in turn.
pub fn gunzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    MultiGzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_output_has_magic_header() {
        let encoded = gzip(b"payload").unwrap();
        assert_eq!(&encoded[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn concatenated_members_decode_in_order() {
        let mut joined = gzip(b"first line\n").unwrap();
        joined.extend(gzip(b"second line\n").unwrap());
        assert_eq!(gunzip(&joined).unwrap(), b"first line\nsecond line\n");
    }

    #[test]
    fn empty_payload_encodes() {
        let encoded = gzip(b"").unwrap();
        assert!(!encoded.is_empty());
        assert!(gunzip(&encoded).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(gunzip(b"definitely not gzip").is_err());
    }
}
