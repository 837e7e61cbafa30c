//! Block framing
//!
//! Every packet on the wire carries exactly one block of `block_size`
//! bytes. Payloads are zero-padded up to a block boundary and split into
//! blocks; the receiver strips trailing zeros after reassembly. That strip
//! cannot tell padding from payload bytes that happen to be zero, so a
//! payload ending in `0x00` loses those bytes.

use crate::error::{ChannelError, Result};

/// Right-pad `data` with zeros to the next multiple of `block_size`
///
/// An empty buffer becomes one zero block, never an empty one.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    if data.is_empty() {
        return vec![0u8; block_size];
    }

    let mut padded = data.to_vec();
    let remainder = data.len() % block_size;
    if remainder != 0 {
        padded.resize(data.len() + (block_size - remainder), 0);
    }
    padded
}

/// Strip all trailing zero bytes
pub fn unpad(data: &[u8]) -> &[u8] {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &data[..end]
}

/// Pad `data` and split it into contiguous `block_size`-byte blocks
pub fn fragment(data: &[u8], block_size: usize) -> Vec<Vec<u8>> {
    pad(data, block_size)
        .chunks(block_size)
        .map(<[u8]>::to_vec)
        .collect()
}

/// Serialize a transfer size as a big-endian integer filling one block
pub fn encode_size(size: u64, block_size: usize) -> Result<Vec<u8>> {
    let be = size.to_be_bytes();
    let significant = &be[size.leading_zeros() as usize / 8..];
    if significant.len() > block_size {
        return Err(ChannelError::SizeOverflow { size, block_size });
    }

    let mut block = vec![0u8; block_size];
    block[block_size - significant.len()..].copy_from_slice(significant);
    Ok(block)
}

/// Read a big-endian size back out of a received block
pub fn decode_size(block: &[u8]) -> Result<u64> {
    let first = block.iter().position(|&b| b != 0).unwrap_or(block.len());
    let significant = &block[first..];
    if significant.len() > 8 {
        return Err(ChannelError::MalformedSize(significant.len()));
    }

    Ok(significant
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_empty_is_one_block() {
        assert_eq!(pad(b"", 4), vec![0u8; 4]);
    }

    #[test]
    fn test_pad_exact_multiple_unchanged() {
        assert_eq!(pad(b"abcdefgh", 4), b"abcdefgh".to_vec());
    }

    #[test]
    fn test_pad_and_unpad() {
        for size in 1..=9 {
            for data in [&b"x"[..], b"hello", b"hello world!", b"\x00\x01\x02"] {
                let padded = pad(data, size);
                assert_eq!(padded.len() % size, 0);
                assert!(padded.len() >= data.len());
                assert_eq!(unpad(&padded), data);
            }
        }
    }

    #[test]
    fn test_unpad_is_lossy_for_trailing_zeros() {
        let data = b"ends in zero\x00\x00";
        assert_eq!(unpad(&pad(data, 8)), b"ends in zero");
        assert_eq!(unpad(&[0, 0, 0]), b"");
    }

    #[test]
    fn test_fragment_hello() {
        let blocks = fragment(b"hello", 4);
        assert_eq!(blocks, vec![b"hell".to_vec(), b"o\x00\x00\x00".to_vec()]);
    }

    #[test]
    fn test_fragment_properties() {
        let data: Vec<u8> = (1..=77u8).collect();
        for size in [1, 3, 7, 32, 77, 100] {
            let blocks = fragment(&data, size);
            let padded = pad(&data, size);

            assert!(blocks.iter().all(|b| b.len() == size));
            assert_eq!(blocks.len(), (padded.len() + size - 1) / size);
            assert_eq!(blocks.concat(), padded);
        }
    }

    #[test]
    fn test_size_block() {
        let block = encode_size(5, 4).unwrap();
        assert_eq!(block, vec![0, 0, 0, 5]);
        assert_eq!(decode_size(&block).unwrap(), 5);

        let wide = encode_size(0x0102_0304_0506, 32).unwrap();
        assert_eq!(wide.len(), 32);
        assert_eq!(decode_size(&wide).unwrap(), 0x0102_0304_0506);

        assert_eq!(encode_size(0, 2).unwrap(), vec![0, 0]);
        assert_eq!(decode_size(&[0, 0]).unwrap(), 0);
    }

    #[test]
    fn test_size_must_fit_block() {
        assert!(matches!(
            encode_size(256, 1),
            Err(ChannelError::SizeOverflow {
                size: 256,
                block_size: 1
            })
        ));
        assert!(encode_size(255, 1).is_ok());
    }

    #[test]
    fn test_oversized_size_block_rejected() {
        let mut block = vec![0u8; 16];
        block[4] = 1;
        assert!(matches!(decode_size(&block), Err(ChannelError::MalformedSize(12))));
    }
}
