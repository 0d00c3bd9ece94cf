use crate::error::{Error, Result};

/// Size of a single tree node (and replica leaf) in bytes.
pub const NODE_SIZE: usize = 32;

/// Returns the start position of the data, 0-indexed.
pub fn data_at_node_offset(v: usize) -> usize {
    v * NODE_SIZE
}

/// Returns the byte slice representing one node (of uniform size, NODE_SIZE) at position v in data.
pub fn data_at_node(data: &[u8], v: usize) -> Result<&[u8]> {
    let offset = data_at_node_offset(v);

    if offset + NODE_SIZE > data.len() {
        return Err(Error::OutOfBounds(offset + NODE_SIZE, data.len()).into());
    }

    Ok(&data[offset..offset + NODE_SIZE])
}

/// Number of leaves of a sector of `sector_size` bytes.
#[inline]
pub fn sector_leafs(sector_size: u64) -> usize {
    sector_size as usize / NODE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_at_node() {
        let data: Vec<u8> = (0..96u8).collect();

        assert_eq!(data_at_node(&data, 0).expect("in bounds")[0], 0);
        assert_eq!(data_at_node(&data, 2).expect("in bounds")[31], 95);
        assert!(data_at_node(&data, 3).is_err());
    }

    #[test]
    fn test_sector_leafs() {
        assert_eq!(sector_leafs(2048), 64);
        assert_eq!(sector_leafs(1 << 25), 1 << 20);
    }
}
