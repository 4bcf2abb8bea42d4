//! Compression codecs applied to serialized batches.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::config::CompressType;

/// Body after compression together with its pre-compression length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedBody {
    pub codec: CompressType,
    pub bytes: Vec<u8>,
    pub raw_size: usize,
}

/// Apply `codec` to `payload`.
///
/// [`CompressType::None`] passes the payload through unchanged.
pub fn compress(codec: CompressType, payload: Vec<u8>) -> io::Result<CompressedBody> {
    let raw_size = payload.len();
    let bytes = match codec {
        CompressType::None => payload,
        CompressType::Gzip => {
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw_size / 2), Compression::default());
            encoder.write_all(&payload)?;
            encoder.finish()?
        }
        CompressType::Lz4 => lz4_flex::block::compress(&payload),
    };
    Ok(CompressedBody {
        codec,
        bytes,
        raw_size,
    })
}

/// Reverse [`compress`]; `raw_size` is the length recorded at compression.
pub fn decompress(codec: CompressType, bytes: &[u8], raw_size: usize) -> io::Result<Vec<u8>> {
    match codec {
        CompressType::None => Ok(bytes.to_vec()),
        CompressType::Gzip => {
            let mut out = Vec::with_capacity(raw_size);
            ZlibDecoder::new(bytes).read_to_end(&mut out)?;
            Ok(out)
        }
        CompressType::Lz4 => lz4_flex::block::decompress(bytes, raw_size)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_payload() -> Vec<u8> {
        br#"{"__logs__":[{"__time__":1,"msg":"hello hello hello hello"}]}"#.repeat(20)
    }

    #[rstest]
    #[case(CompressType::Gzip)]
    #[case(CompressType::Lz4)]
    fn codecs_round_trip_and_shrink(#[case] codec: CompressType) {
        let payload = sample_payload();
        let body = compress(codec, payload.clone()).expect("compress");
        assert_eq!(body.raw_size, payload.len());
        assert!(body.bytes.len() < payload.len());
        let restored = decompress(codec, &body.bytes, body.raw_size).expect("decompress");
        assert_eq!(restored, payload);
    }

    #[rstest]
    #[case(CompressType::None)]
    #[case(CompressType::Gzip)]
    #[case(CompressType::Lz4)]
    fn empty_input_round_trips(#[case] codec: CompressType) {
        let body = compress(codec, Vec::new()).expect("compress");
        assert_eq!(body.raw_size, 0);
        let restored = decompress(codec, &body.bytes, 0).expect("decompress");
        assert!(restored.is_empty());
    }

    #[rstest]
    fn none_passes_through() {
        let payload = sample_payload();
        let body = compress(CompressType::None, payload.clone()).expect("compress");
        assert_eq!(body.bytes, payload);
    }

    #[rstest]
    fn corrupt_lz4_is_reported() {
        let err = decompress(CompressType::Lz4, &[0xFF, 0xFF, 0xFF], 64).expect_err("corrupt");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
