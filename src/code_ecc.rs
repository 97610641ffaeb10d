/// The error correction level encoded in a QR Code symbol's format
/// information.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum ErrorCorrection {
    /// Tolerates about 7% erroneous codewords.
    Low,
    /// Tolerates about 15% erroneous codewords.
    Medium,
    /// Tolerates about 25% erroneous codewords.
    Quartile,
    /// Tolerates about 30% erroneous codewords.
    High,
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] =
        [ErrorCorrection::Low, ErrorCorrection::Medium, ErrorCorrection::Quartile, ErrorCorrection::High];

    /// Index into the per-version capacity tables: Low=0, Medium=1,
    /// Quartile=2, High=3.
    pub fn ordinal(self) -> usize {
        use ErrorCorrection::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// The 2-bit wire code stored in the format information field.
    pub fn format_bits(self) -> u8 {
        use ErrorCorrection::*;
        match self {
            Low => 0b01,
            Medium => 0b00,
            Quartile => 0b11,
            High => 0b10,
        }
    }

    /// Inverse of [`ErrorCorrection::format_bits`].
    pub fn from_format_bits(bits: u8) -> Option<ErrorCorrection> {
        use ErrorCorrection::*;
        match bits & 0b11 {
            0b01 => Some(Low),
            0b00 => Some(Medium),
            0b11 => Some(Quartile),
            0b10 => Some(High),
            _ => unreachable!(),
        }
    }
}
