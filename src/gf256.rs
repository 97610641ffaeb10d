//! Arithmetic in GF(2^8) with primitive polynomial 0x11d.
//!
//! The teacher crate's Reed-Solomon encoder (`QrCode::reed_solomon_multiply`)
//! computed products with "Russian peasant multiplication" on every call.
//! A decoder additionally needs `log`/`inv`/`pow` and Chien search, which are
//! cheap only with precomputed tables, so this module builds the classic
//! log/exp tables once and shares them read-only.
use crate::error::{QrError, QrResult};

const PRIMITIVE: u16 = 0x11d;

lazy_static::lazy_static! {
    static ref EXP: [u8; 256] = build_exp();
    static ref LOG: [u8; 256] = build_log(&EXP);
}

fn build_exp() -> [u8; 256] {
    let mut exp = [0u8; 256];
    let mut x: u16 = 1;
    for e in exp.iter_mut().take(255) {
        *e = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
    }
    exp[255] = exp[0]; // alpha^255 == alpha^0 == 1, kept for mod-255 convenience
    exp
}

fn build_log(exp: &[u8; 256]) -> [u8; 256] {
    let mut log = [0u8; 256];
    for i in 0..255 {
        log[exp[i] as usize] = i as u8;
    }
    log
}

pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let sum = (LOG[a as usize] as usize + LOG[b as usize] as usize) % 255;
    EXP[sum]
}

pub fn pow(a: u8, e: i32) -> u8 {
    if a == 0 {
        return 0;
    }
    let e = e.rem_euclid(255) as usize;
    let p = (LOG[a as usize] as usize * e) % 255;
    EXP[p]
}

pub fn inv(a: u8) -> QrResult<u8> {
    if a == 0 {
        return Err(QrError::InvalidArgument("GF(256) inverse of 0".into()));
    }
    Ok(EXP[255 - LOG[a as usize] as usize])
}

pub fn log(a: u8) -> QrResult<u8> {
    if a == 0 {
        return Err(QrError::InvalidArgument("GF(256) log of 0".into()));
    }
    Ok(LOG[a as usize])
}

pub fn exp(e: u8) -> u8 {
    EXP[e as usize % 255]
}

/// A non-empty polynomial over GF(256), coefficient-first (index 0 is the
/// highest-degree term), matching spec.md's `polynomial(p)` convention.
pub type Poly = Vec<u8>;

/// Strips leading zero coefficients; the zero polynomial is `[0]`.
pub fn polynomial(mut p: Poly) -> Poly {
    while p.len() > 1 && p[0] == 0 {
        p.remove(0);
    }
    if p.is_empty() {
        p.push(0);
    }
    p
}

pub fn degree(p: &[u8]) -> usize {
    p.len() - 1
}

pub fn coefficient(p: &[u8], d: usize) -> u8 {
    p[degree(p) - d]
}

pub fn add_poly(a: &[u8], b: &[u8]) -> Poly {
    let (longer, shorter) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut result = longer.to_vec();
    let offset = longer.len() - shorter.len();
    for (i, &c) in shorter.iter().enumerate() {
        result[offset + i] ^= c;
    }
    polynomial(result)
}

pub fn mul_poly_scalar(p: &[u8], c: u8) -> Poly {
    polynomial(p.iter().map(|&x| mul(x, c)).collect())
}

/// Multiplies `p` by the monomial `c * X^d`.
pub fn mul_poly_monomial(p: &[u8], d: usize, c: u8) -> Poly {
    if c == 0 {
        return vec![0];
    }
    let mut result = mul_poly_scalar(p, c);
    result.extend(std::iter::repeat(0).take(d));
    polynomial(result)
}

pub fn mul_poly(a: &[u8], b: &[u8]) -> Poly {
    let mut result = vec![0u8; degree(a) + degree(b) + 1];
    for (i, &ac) in a.iter().enumerate() {
        if ac == 0 {
            continue;
        }
        for (j, &bc) in b.iter().enumerate() {
            result[i + j] ^= mul(ac, bc);
        }
    }
    polynomial(result)
}

/// Horner evaluation of `p` at `x`.
pub fn eval_poly(p: &[u8], x: u8) -> u8 {
    let mut result = 0u8;
    for &c in p {
        result = mul(result, x) ^ c;
    }
    result
}

/// `product_{i=0}^{d-1} (X + alpha^i)`, the Reed-Solomon ECC generator
/// polynomial of degree `d`. Grounded on the teacher's
/// `reed_solomon_compute_divisor`, generalized to return coefficient-first
/// polynomials including the leading 1 (spec.md's convention; the teacher
/// drops the leading 1 implicitly).
pub fn divisor_poly(d: usize) -> Poly {
    let mut result: Poly = vec![1];
    let mut root: u8 = 1; // alpha^0
    for _ in 0..d {
        result = mul_poly(&result, &[1, root]);
        root = mul(root, 2);
    }
    result
}

/// Remainder of `data * X^len(div)-1` divided by `div`, i.e. the systematic
/// Reed-Solomon remainder computation (teacher: `reed_solomon_compute_remainder`).
pub fn remainder_poly(data: &[u8], div: &[u8]) -> Poly {
    let mut result = vec![0u8; div.len() - 1];
    for &b in data {
        let factor = b ^ result[0];
        result.remove(0);
        result.push(0);
        for (x, &y) in result.iter_mut().zip(div.iter().skip(1)) {
            *x ^= mul(y, factor);
        }
    }
    result
}

/// Extended Euclidean algorithm run until `2*deg(r) < r_limit`, returning
/// `(sigma, omega)` normalized so `sigma(0) == 1`. Used by the
/// Berlekamp-Massey-free Reed-Solomon decoder in [`crate::reed_solomon`].
pub fn euclidian(a: &[u8], b: &[u8], r_limit: usize) -> QrResult<(Poly, Poly)> {
    let (mut r0, mut r1) = (a.to_vec(), b.to_vec());
    let (mut t0, mut t1): (Poly, Poly) = (vec![0], vec![1]);

    while 2 * degree(&r1) >= r_limit {
        let (q, r) = div_poly(&r0, &r1)?;
        let t = add_poly(&mul_poly(&q, &t1), &t0);
        r0 = r1;
        r1 = r;
        t0 = t1;
        t1 = t;
    }

    let sigma0 = t1.last().copied().unwrap_or(0);
    if sigma0 == 0 {
        return Err(QrError::Decode("sigma(0) == 0 in extended Euclid".into()));
    }
    let norm = inv(sigma0)?;
    let sigma = mul_poly_scalar(&t1, norm);
    let omega = mul_poly_scalar(&r1, norm);
    Ok((sigma, omega))
}

/// Polynomial long division `a / b`, returning `(quotient, remainder)`.
fn div_poly(a: &[u8], b: &[u8]) -> QrResult<(Poly, Poly)> {
    let mut remainder = a.to_vec();
    let mut quotient = vec![0u8; 1];
    while degree(&remainder) >= degree(b) && !(remainder.len() == 1 && remainder[0] == 0) {
        let lead = remainder[0];
        if lead == 0 {
            remainder.remove(0);
            continue;
        }
        if b[0] == 0 {
            return Err(QrError::Decode("leading coefficient 0 in extended Euclid".into()));
        }
        let coeff = mul(lead, inv(b[0])?);
        let shift = remainder.len() - b.len();
        let term = mul_poly_monomial(b, shift, coeff);
        remainder = add_poly(&remainder, &term);
        let mut q_term = vec![0u8; shift + 1];
        q_term[0] = coeff;
        quotient = add_poly(&quotient, &q_term);
    }
    Ok((polynomial(quotient), polynomial(remainder)))
}
