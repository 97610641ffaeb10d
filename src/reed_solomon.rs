//! Reed-Solomon codec over GF(256), parameterized by the number of ECC
//! (parity) codewords per block.
//!
//! The encode half is ground truth lifted almost verbatim from the
//! teacher's `QrCode::add_ecc_and_interleave` inner loop
//! (`reed_solomon_compute_remainder` against `reed_solomon_compute_divisor`);
//! the decode half (syndromes, extended Euclid, Chien search, Forney) is new
//! because the teacher only ever encodes.
use crate::error::{QrError, QrResult};
use crate::gf256::{self, Poly};

/// A Reed-Solomon codec fixed to a given number of ECC words per block.
pub struct ReedSolomon {
    pub ecc_words: usize,
    divisor: Poly,
}

impl ReedSolomon {
    pub fn new(ecc_words: usize) -> Self {
        Self { ecc_words, divisor: gf256::divisor_poly(ecc_words) }
    }

    /// Returns the `ecc_words`-byte remainder of `data * X^ecc_words` divided
    /// by the generator polynomial.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        gf256::remainder_poly(data, &self.divisor)
    }

    /// Corrects `codeword` in place (conceptually; a corrected copy is
    /// returned) and returns it. `codeword` is coefficient-first: index 0 is
    /// the highest-degree (first transmitted) byte.
    pub fn decode(&self, codeword: &[u8]) -> QrResult<Vec<u8>> {
        let mut word = codeword.to_vec();
        let syndromes = self.syndromes(&word);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(word);
        }

        // Syndrome polynomial, coefficient-first, matching spec.md's
        // convention: S(X) = S_0 + S_1 X + ... (here built high-to-low so
        // gf256::eval_poly's Horner form agrees with euclidian()'s usage).
        let mut syndrome_poly: Poly = syndromes.iter().rev().copied().collect();
        syndrome_poly = gf256::polynomial(syndrome_poly);

        let monomial = {
            let mut m = vec![0u8; self.ecc_words + 1];
            m[0] = 1;
            m
        };

        let (sigma, omega) = gf256::euclidian(&monomial, &syndrome_poly, self.ecc_words)?;

        let degree = gf256::degree(&sigma);
        let mut locators = Vec::new();
        for i in 1..=255u16 {
            let root = gf256::exp(255 - i as u8);
            if gf256::eval_poly(&sigma, root) == 0 {
                // sigma's roots are the inverses of the error locators (X_k),
                // per spec.md §4.2's convention of indexing syndromes from α^0.
                locators.push(gf256::inv(root)?);
            }
        }
        if locators.len() != degree {
            return Err(QrError::Decode(format!(
                "found {} error locators, expected {} from sigma degree",
                locators.len(),
                degree
            )));
        }

        for &x_k in &locators {
            let log_xk = gf256::log(x_k)?;
            let pos = word.len() as i32 - 1 - log_xk as i32;
            if pos < 0 {
                return Err(QrError::Decode("error locator outside codeword".into()));
            }
            let inv_xk = gf256::inv(x_k)?;

            let mut denom = 1u8;
            for &x_j in &locators {
                if x_j == x_k {
                    continue;
                }
                let term = gf256::add(1, gf256::mul(x_j, inv_xk));
                denom = gf256::mul(denom, term);
            }
            if denom == 0 {
                return Err(QrError::Decode("zero Forney denominator".into()));
            }
            let correction =
                gf256::mul(gf256::eval_poly(&omega, inv_xk), gf256::inv(denom)?);
            word[pos as usize] ^= correction;
        }

        let residual = self.syndromes(&word);
        if residual.iter().any(|&s| s != 0) {
            return Err(QrError::Decode("block uncorrectable".into()));
        }
        Ok(word)
    }

    fn syndromes(&self, codeword: &[u8]) -> Vec<u8> {
        (0..self.ecc_words).map(|i| gf256::eval_poly(codeword, gf256::exp(i as u8))).collect()
    }
}
