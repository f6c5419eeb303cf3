//! Fixed-point arithmetic helpers.
//!
//! All percentages, ratios and USD values in the engine are integers scaled
//! to 18 decimals. Division always floors; callers that need ceiling
//! semantics add one to the result themselves. Intermediate products are
//! widened to 512 bits so an 18-decimal value times an 18-decimal fraction
//! cannot overflow.

use crate::common::{U256, U512};

/// Number of decimals in the fixed-point representation.
pub const FIXED_POINT_DECIMALS: u32 = 18;

/// `10^18`, the fixed-point unit.
pub fn fixed_point() -> U256 {
	U256::exp10(FIXED_POINT_DECIMALS as usize)
}

/// `a * numer / denom` with a 512-bit intermediate, floor division.
///
/// Returns zero when `denom` is zero.
pub fn mul_frac(a: U256, numer: U256, denom: U256) -> U256 {
	if denom.is_zero() {
		return U256::zero();
	}
	let wide = a.full_mul(numer) / U512::from(denom);
	U256::try_from(wide).unwrap_or(U256::MAX)
}

/// Scales `n`, a value with `frac_digits` fractional digits, to 18 decimals.
///
/// `to_fp(U256::from(15), 1)` is 1.5 in fixed point.
pub fn to_fp(n: U256, frac_digits: u32) -> U256 {
	if frac_digits <= FIXED_POINT_DECIMALS {
		n * U256::exp10((FIXED_POINT_DECIMALS - frac_digits) as usize)
	} else {
		n / U256::exp10((frac_digits - FIXED_POINT_DECIMALS) as usize)
	}
}

/// Converts `x` from `from` decimals to `to` decimals.
///
/// Lossless only when `to >= from`; otherwise floor-divides.
pub fn convert_decimals(from: u8, to: u8, x: U256) -> U256 {
	if to >= from {
		x * U256::exp10((to - from) as usize)
	} else {
		x / U256::exp10((from - to) as usize)
	}
}

/// The fixed-point fraction `part / whole`, or zero when `whole` is zero.
pub fn as_pct_fp(part: U256, whole: U256) -> U256 {
	mul_frac(part, fixed_point(), whole)
}

/// Applies an 18-decimal fraction to an amount.
pub fn pct_of(amount: U256, pct_fp: U256) -> U256 {
	mul_frac(amount, pct_fp, fixed_point())
}

/// Parses a decimal string such as `"0.0015"` into an 18-decimal integer.
pub fn parse_fp(s: &str) -> Option<U256> {
	let s = s.trim();
	if s.is_empty() || s.starts_with('-') {
		return None;
	}
	let (whole, frac) = match s.split_once('.') {
		Some((w, f)) => (w, f),
		None => (s, ""),
	};
	if frac.len() > FIXED_POINT_DECIMALS as usize {
		return None;
	}
	let whole: U256 = if whole.is_empty() {
		U256::zero()
	} else {
		U256::from_dec_str(whole).ok()?
	};
	let frac_scaled = if frac.is_empty() {
		U256::zero()
	} else {
		U256::from_dec_str(frac).ok()? * U256::exp10(FIXED_POINT_DECIMALS as usize - frac.len())
	};
	whole.checked_mul(fixed_point())?.checked_add(frac_scaled)
}
