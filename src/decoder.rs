//! Bit-level decoding (spec.md §4.7): format/version recovery, the zigzag
//! data read, de-interleaving, Reed-Solomon correction and segment parsing.
use crate::bitmap::Bitmap;
use crate::code_ecc::ErrorCorrection;
use crate::error::{QrError, QrResult};
use crate::interleave::deinterleave;
use crate::mask::Mask;
use crate::reed_solomon::ReedSolomon;
use crate::segment_mode::SegmentMode;
use crate::tables::{self, capacity};
use crate::template::{draw_template, walk_zigzag};
use crate::version::Version;

fn bit(b: &Bitmap, x: i32, y: i32) -> u32 {
    u32::from(b.get(x as usize, y as usize).is_on())
}

/// Mirrors [`crate::template::draw_format_bits`]'s first location (around
/// the top-left finder).
fn read_format_copy_a(b: &Bitmap) -> u32 {
    let mut bits = 0u32;
    for i in 0..6 {
        bits |= bit(b, 8, i) << i;
    }
    bits |= bit(b, 8, 7) << 6;
    bits |= bit(b, 8, 8) << 7;
    bits |= bit(b, 7, 8) << 8;
    for i in 9..15 {
        bits |= bit(b, 14 - i, 8) << i;
    }
    bits
}

/// Mirrors the second location, split across the top-right and bottom-left
/// finders.
fn read_format_copy_b(b: &Bitmap, size: i32) -> u32 {
    let mut bits = 0u32;
    for i in 0..8 {
        bits |= bit(b, size - 1 - i, 8) << i;
    }
    for i in 8..15 {
        bits |= bit(b, 8, size - 15 + i) << i;
    }
    bits
}

fn recover_format(b: &Bitmap, size: i32) -> QrResult<(ErrorCorrection, Mask)> {
    let c1 = read_format_copy_a(b);
    let c2 = read_format_copy_b(b, size);

    let mut best: Option<(u32, ErrorCorrection, Mask)> = None;
    for &ecc in ErrorCorrection::ALL.iter() {
        for m in 0..8u8 {
            let expected = tables::format_bits(ecc, m);
            let dist = (expected ^ c1).count_ones().min((expected ^ c2).count_ones());
            if best.as_ref().map(|&(d, _, _)| dist < d).unwrap_or(true) {
                best = Some((dist, ecc, Mask::new(m)));
            }
        }
    }
    match best {
        Some((d, ecc, mask)) if d <= 3 => Ok((ecc, mask)),
        _ => Err(QrError::InvalidFormat),
    }
}

/// Reads both copies of the 18-bit version field (mirrors
/// [`crate::template::draw_version_bits`]'s symmetric write).
fn read_version_copies(b: &Bitmap, size: i32) -> (u32, u32) {
    let (mut v1, mut v2) = (0u32, 0u32);
    for i in 0..18u32 {
        let a = size - 11 + (i as i32 % 3);
        let bv = i as i32 / 3;
        v1 |= bit(b, a, bv) << i;
        v2 |= bit(b, bv, a) << i;
    }
    (v1, v2)
}

fn recover_version(b: &Bitmap, size: i32) -> QrResult<Version> {
    let size_version = Version::size_decode(size)?;
    if size_version.value() < 7 {
        return Ok(size_version);
    }

    let (v1, v2) = read_version_copies(b, size);
    let mut best: Option<(u32, Version)> = None;
    for v in 7..=40u8 {
        let ver = Version::new(v);
        let expected = tables::version_bits(ver);
        let dist = (expected ^ v1).count_ones().min((expected ^ v2).count_ones());
        if best.as_ref().map(|&(d, _)| dist < d).unwrap_or(true) {
            best = Some((dist, ver));
        }
    }
    match best {
        Some((d, ver)) if d <= 3 => {
            if ver.size() != size {
                return Err(QrError::InvalidVersion);
            }
            Ok(ver)
        }
        _ => Err(QrError::InvalidVersion),
    }
}

/// Decodes a rectified, `size`x`size` module grid into its payload text.
pub fn decode_symbol(sampled: &Bitmap) -> QrResult<String> {
    let size = sampled.width as i32;
    if sampled.height as i32 != size {
        return Err(QrError::Decode("rectified symbol is not square".into()));
    }

    let (ecc, mask) = recover_format(sampled, size)?;
    let version = recover_version(sampled, size)?;

    let template = draw_template(version);
    if template.width as i32 != size {
        return Err(QrError::InvalidVersion);
    }

    let cap = capacity(version, ecc);
    let mut bits = Vec::with_capacity(cap.total * 8);
    walk_zigzag(&template, mask, |x, y, mask_bit| {
        bits.push(sampled.get(x, y).is_on() ^ mask_bit);
    });
    if bits.len() != cap.total * 8 {
        return Err(QrError::Decode(format!(
            "expected {} data bits, read {}",
            cap.total * 8,
            bits.len()
        )));
    }

    let codewords: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
        .collect();

    let blocks = deinterleave(&codewords, &cap)?;
    let rs = ReedSolomon::new(cap.ecc_words);
    let mut data = Vec::with_capacity(cap.data_bits / 8);
    for (block_data, block_ecc) in &blocks {
        let mut codeword = block_data.clone();
        codeword.extend_from_slice(block_ecc);
        let corrected = rs.decode(&codeword)?;
        data.extend_from_slice(&corrected[..block_data.len()]);
    }

    parse_segments(&data, version)
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    fn read(&mut self, n: usize) -> QrResult<u32> {
        if n > self.remaining() {
            return Err(QrError::Decode("bit stream exhausted mid-segment".into()));
        }
        let mut v = 0u32;
        for _ in 0..n {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - (self.pos % 8))) & 1;
            v = (v << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(v)
    }
}

fn parse_segments(data: &[u8], version: Version) -> QrResult<String> {
    let mut reader = BitReader::new(data);
    let mut out = String::new();
    loop {
        if reader.remaining() < 4 {
            break;
        }
        let mode_bits = reader.read(4)?;
        let mode = match mode_bits {
            0b0000 => break, // terminator
            0b0001 => SegmentMode::Numeric,
            0b0010 => SegmentMode::Alphanumeric,
            0b0100 => SegmentMode::Byte,
            0b0111 => SegmentMode::Eci,
            0b1000 => SegmentMode::Kanji,
            _ => return Err(QrError::Decode(format!("unrecognized segment mode {mode_bits:#06b}"))),
        };
        if matches!(mode, SegmentMode::Kanji | SegmentMode::Eci) {
            return Err(QrError::Decode("Kanji and ECI segments are unsupported".into()));
        }

        let count_bits = mode.num_char_count_bits(version) as usize;
        let count = reader.read(count_bits)? as usize;
        match mode {
            SegmentMode::Numeric => decode_numeric(&mut reader, count, &mut out)?,
            SegmentMode::Alphanumeric => decode_alphanumeric(&mut reader, count, &mut out)?,
            SegmentMode::Byte => decode_byte(&mut reader, count, &mut out)?,
            SegmentMode::Kanji | SegmentMode::Eci => unreachable!(),
        }
    }
    Ok(out)
}

fn decode_numeric(reader: &mut BitReader, count: usize, out: &mut String) -> QrResult<()> {
    let mut remaining = count;
    while remaining >= 3 {
        let v = reader.read(10)?;
        if v >= 1000 {
            return Err(QrError::Decode("numeric group out of range".into()));
        }
        out.push_str(&format!("{v:03}"));
        remaining -= 3;
    }
    if remaining == 2 {
        let v = reader.read(7)?;
        if v >= 100 {
            return Err(QrError::Decode("numeric group out of range".into()));
        }
        out.push_str(&format!("{v:02}"));
    } else if remaining == 1 {
        let v = reader.read(4)?;
        if v >= 10 {
            return Err(QrError::Decode("numeric group out of range".into()));
        }
        out.push_str(&format!("{v}"));
    }
    Ok(())
}

fn decode_alphanumeric(reader: &mut BitReader, count: usize, out: &mut String) -> QrResult<()> {
    let charset: Vec<char> = tables::ALPHANUMERIC_CHARSET.chars().collect();
    let lookup = |i: usize| -> QrResult<char> {
        charset.get(i).copied().ok_or_else(|| QrError::Decode("alphanumeric index out of range".into()))
    };

    let mut remaining = count;
    while remaining >= 2 {
        let v = reader.read(11)? as usize;
        out.push(lookup(v / 45)?);
        out.push(lookup(v % 45)?);
        remaining -= 2;
    }
    if remaining == 1 {
        let v = reader.read(6)? as usize;
        out.push(lookup(v)?);
    }
    Ok(())
}

fn decode_byte(reader: &mut BitReader, count: usize, out: &mut String) -> QrResult<()> {
    let mut bytes = Vec::with_capacity(count);
    for _ in 0..count {
        bytes.push(reader.read(8)? as u8);
    }
    let s = std::str::from_utf8(&bytes)
        .map_err(|e| QrError::Decode(format!("invalid UTF-8 in byte segment: {e}")))?;
    out.push_str(s);
    Ok(())
}
