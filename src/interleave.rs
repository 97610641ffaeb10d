//! Splits/merges interleaved codeword blocks per the version+ECC capacity
//! layout (spec.md §4.8). Grounded on the teacher's
//! `QrCode::add_ecc_and_interleave`, run in the opposite (de-interleave)
//! direction.
use crate::error::{QrError, QrResult};
use crate::tables::Capacity;

/// Splits `total`-byte interleaved codewords back into per-block
/// `(data, ecc)` pairs: short blocks first, then long blocks, then the
/// interleaved ECC columns.
pub fn deinterleave(codewords: &[u8], cap: &Capacity) -> QrResult<Vec<(Vec<u8>, Vec<u8>)>> {
    if codewords.len() != cap.total {
        return Err(QrError::Decode(format!(
            "expected {} interleaved codewords, got {}",
            cap.total,
            codewords.len()
        )));
    }

    let mut blocks: Vec<Vec<u8>> = (0..cap.num_blocks)
        .map(|i| {
            let len = cap.block_len + usize::from(i >= cap.short_blocks);
            Vec::with_capacity(len)
        })
        .collect();

    let mut idx = 0;
    for i in 0..=cap.block_len {
        for (j, block) in blocks.iter_mut().enumerate() {
            // cap.block_len is already the short block's data length (ecc
            // excluded); a short block has no byte at that index, only long
            // blocks (j >= short_blocks) do.
            if i != cap.block_len || j >= cap.short_blocks {
                block.push(codewords[idx]);
                idx += 1;
            }
        }
    }

    let mut eccs: Vec<Vec<u8>> = (0..cap.num_blocks).map(|_| Vec::with_capacity(cap.ecc_words)).collect();
    for _ in 0..cap.ecc_words {
        for ecc in eccs.iter_mut() {
            ecc.push(codewords[idx]);
            idx += 1;
        }
    }

    Ok(blocks.into_iter().zip(eccs).collect())
}

/// Inverse of [`deinterleave`]: reassembles interleaved codewords from
/// per-block `(data, ecc)` pairs. Used by round-trip tests.
pub fn interleave(blocks: &[(Vec<u8>, Vec<u8>)], cap: &Capacity) -> Vec<u8> {
    let mut out = Vec::with_capacity(cap.total);
    for i in 0..=cap.block_len {
        for (j, (data, _)) in blocks.iter().enumerate() {
            if i != cap.block_len || j >= cap.short_blocks {
                out.push(data[i]);
            }
        }
    }
    for i in 0..cap.ecc_words {
        for (_, ecc) in blocks {
            out.push(ecc[i]);
        }
    }
    out
}
