use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::Limb;
use crate::primitive::{adc, mac, sbb};

/// a + b over L limbs, ripple carry. One pass regardless of magnitude.
#[inline(always)]
pub(crate) fn add_limbs<const L: usize>(a: &[Limb; L], b: &[Limb; L]) -> ([Limb; L], bool) {
    let mut out = [0; L];
    let mut carry = false;
    for i in 0..L {
        (out[i], carry) = adc(a[i], b[i], carry);
    }
    (out, carry)
}

/// a - b over L limbs, ripple borrow.
#[inline(always)]
pub(crate) fn sub_limbs<const L: usize>(a: &[Limb; L], b: &[Limb; L]) -> ([Limb; L], bool) {
    let mut out = [0; L];
    let mut borrow = false;
    for i in 0..L {
        (out[i], borrow) = sbb(a[i], b[i], borrow);
    }
    (out, borrow)
}

/// Full-width equality, no early exit.
#[inline(always)]
pub(crate) fn ct_eq_limbs<const L: usize>(a: &[Limb; L], b: &[Limb; L]) -> Choice {
    let mut acc: Limb = 0;
    for i in 0..L {
        acc |= a[i] ^ b[i];
    }
    acc.ct_eq(&0)
}

/// a < b, read off the borrow of a full-width subtraction.
#[inline(always)]
pub(crate) fn ct_lt_limbs<const L: usize>(a: &[Limb; L], b: &[Limb; L]) -> Choice {
    let (_, borrow) = sub_limbs(a, b);
    Choice::from(borrow as u8)
}

#[inline(always)]
pub(crate) fn is_zero_limbs<const L: usize>(a: &[Limb; L]) -> Choice {
    let mut acc: Limb = 0;
    for i in 0..L {
        acc |= a[i];
    }
    acc.ct_eq(&0)
}

/// Returns b if the choice is set, a otherwise.
#[inline(always)]
pub(crate) fn select_limbs<const L: usize>(
    a: &[Limb; L],
    b: &[Limb; L],
    choice: Choice,
) -> [Limb; L] {
    let mut out = [0; L];
    for i in 0..L {
        out[i] = Limb::conditional_select(&a[i], &b[i], choice);
    }
    out
}

/// Returns a - m if the value (carry:a) >= m, a unchanged otherwise.
/// The caller provides (carry:a) < 2m, so the result is in [0, m).
#[inline(always)]
pub(crate) fn sub_cond<const L: usize>(a: &[Limb; L], carry: bool, m: &[Limb; L]) -> [Limb; L] {
    let (diff, borrow) = sub_limbs(a, m);
    let take = Choice::from(carry as u8) | !Choice::from(borrow as u8);
    select_limbs(a, &diff, take)
}

/// Returns a + m iff borrow.
/// The input provides that -borrow*2^(64L) + a >= -m.
#[inline(always)]
pub(crate) fn add_cond<const L: usize>(a: &[Limb; L], borrow: bool, m: &[Limb; L]) -> [Limb; L] {
    // if borrow = 1, mask = 0xff..ff(-1), otherwise mask = 0.
    let mask = (borrow as Limb).wrapping_neg();
    let mut out = [0; L];
    let mut carry = false;
    for i in 0..L {
        (out[i], carry) = adc(a[i], m[i] & mask, carry);
    }
    out
}

/// (a + b) mod m for a, b in [0, m). One correction step, no retries.
#[inline(always)]
pub(crate) fn add_mod<const L: usize>(
    a: &[Limb; L],
    b: &[Limb; L],
    m: &[Limb; L],
) -> [Limb; L] {
    let (sum, carry) = add_limbs(a, b);
    sub_cond(&sum, carry, m)
}

/// (a - b) mod m for a, b in [0, m).
#[inline(always)]
pub(crate) fn sub_mod<const L: usize>(
    a: &[Limb; L],
    b: &[Limb; L],
    m: &[Limb; L],
) -> [Limb; L] {
    let (diff, borrow) = sub_limbs(a, b);
    add_cond(&diff, borrow, m)
}

/// 2a mod m.
#[inline(always)]
pub(crate) fn double_mod<const L: usize>(a: &[Limb; L], m: &[Limb; L]) -> [Limb; L] {
    add_mod(a, a, m)
}

/// Schoolbook product, 2L limbs split into halves. No truncation.
pub(crate) fn mul_wide_limbs<const L: usize>(
    a: &[Limb; L],
    b: &[Limb; L],
) -> ([Limb; L], [Limb; L]) {
    let mut lo = [0; L];
    let mut hi = [0; L];
    for i in 0..L {
        let mut carry = 0;
        for j in 0..L {
            let idx = i + j;
            let t = if idx < L { lo[idx] } else { hi[idx - L] };
            let (r, c) = mac(t, a[i], b[j], carry);
            if idx < L {
                lo[idx] = r;
            } else {
                hi[idx - L] = r;
            }
            carry = c;
        }
        // row carry lands at limb i + L, untouched so far
        hi[i] = carry;
    }
    (lo, hi)
}

/// Squaring via the cross-product, double, diagonal split.
pub(crate) fn square_wide_limbs<const L: usize>(a: &[Limb; L]) -> ([Limb; L], [Limb; L]) {
    let mut lo = [0; L];
    let mut hi = [0; L];

    // off-diagonal products a[i]*a[j], i < j
    for i in 0..L {
        let mut carry = 0;
        for j in (i + 1)..L {
            let idx = i + j;
            let t = if idx < L { lo[idx] } else { hi[idx - L] };
            let (r, c) = mac(t, a[i], a[j], carry);
            if idx < L {
                lo[idx] = r;
            } else {
                hi[idx - L] = r;
            }
            carry = c;
        }
        if i + 1 < L {
            hi[i] = carry;
        }
    }

    // *2; the doubled cross sum is below half of 2^(128L), so no carry out
    let mut carry = false;
    for i in 0..L {
        (lo[i], carry) = adc(lo[i], lo[i], carry);
    }
    for i in 0..L {
        (hi[i], carry) = adc(hi[i], hi[i], carry);
    }
    debug_assert!(!carry);

    // add the square parts a[i]^2 at limbs 2i, 2i+1
    let mut carry = false;
    for i in 0..L {
        let (d_lo, d_hi) = mac(0, a[i], a[i], 0);
        let idx = 2 * i;
        let t = if idx < L { lo[idx] } else { hi[idx - L] };
        let (r, c1) = adc(t, d_lo, carry);
        if idx < L {
            lo[idx] = r;
        } else {
            hi[idx - L] = r;
        }
        let idx = idx + 1;
        let t = if idx < L { lo[idx] } else { hi[idx - L] };
        let (r, c2) = adc(t, d_hi, c1);
        if idx < L {
            lo[idx] = r;
        } else {
            hi[idx - L] = r;
        }
        carry = c2;
    }
    debug_assert!(!carry);

    (lo, hi)
}
