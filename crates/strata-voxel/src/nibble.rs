//! Two 4-bit values per byte, low nibble first.

/// Packs values (masked to 4 bits) pairwise. An odd trailing value takes the
/// low nibble of the last byte.
pub fn pack(values: &[u8]) -> Vec<u8> {
    values
        .chunks(2)
        .map(|pair| {
            let lo = pair[0] & 0x0F;
            let hi = pair.get(1).copied().unwrap_or(0) & 0x0F;
            lo | hi << 4
        })
        .collect()
}

/// Unpacks `len` values. Returns `None` when `packed` is too short.
pub fn unpack(packed: &[u8], len: usize) -> Option<Vec<u8>> {
    if packed.len() < len.div_ceil(2) {
        return None;
    }
    Some(
        (0..len)
            .map(|i| {
                let byte = packed[i / 2];
                if i % 2 == 0 { byte & 0x0F } else { byte >> 4 }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_order() {
        assert_eq!(pack(&[1, 2, 15, 0]), vec![0x21, 0x0F]);
        assert_eq!(pack(&[7]), vec![0x07]);
    }

    #[test]
    fn test_pack_masks_high_bits() {
        assert_eq!(pack(&[0xF3, 0x14]), vec![0x43]);
    }

    #[test]
    fn test_unpack() {
        let values: Vec<u8> = (0..33).map(|i| (i * 7 % 16) as u8).collect();
        assert_eq!(unpack(&pack(&values), values.len()).unwrap(), values);
        assert!(unpack(&[0x11], 3).is_none());
    }
}
