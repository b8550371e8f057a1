//! Montgomery reduction engine. Division free; the only data-dependent
//! values ever formed are limb products and carries, never addresses or
//! branches.

use subtle::Choice;

use crate::arith::{double_mod, select_limbs, sub_limbs};
use crate::primitive::{adc, mac};
use crate::{LIMB_BITS, Limb};

/// -m^-1 mod 2^64 for odd m, by Newton doubling. Six rounds lift the
/// inverse from 1 bit to 64.
pub(crate) fn neg_inv_word(m0: Limb) -> Limb {
    debug_assert!(m0 & 1 == 1);
    let mut inv: Limb = 1;
    for _ in 0..6 {
        inv = inv.wrapping_mul((2 as Limb).wrapping_sub(m0.wrapping_mul(inv)));
    }
    inv.wrapping_neg()
}

/// (R mod m, R^2 mod m) for R = 2^(64L), by modular doubling from 1.
/// Setup-time path; m is public.
pub(crate) fn mont_constants<const L: usize>(m: &[Limb; L]) -> ([Limb; L], [Limb; L]) {
    let mut acc = [0; L];
    acc[0] = 1;
    for _ in 0..(LIMB_BITS * L) {
        acc = double_mod(&acc, m);
    }
    let r = acc;
    for _ in 0..(LIMB_BITS * L) {
        acc = double_mod(&acc, m);
    }
    (r, acc)
}

/// Word-by-word REDC: t * R^-1 mod m, canonical in [0, m), for any t < m*R.
///
/// Round i folds limb i with u = t[i] * inv and ripples the row carry to
/// the top. The accumulator stays below 2*m*R, so the spill above 2L limbs
/// is one bit and a single conditional subtract finishes the job.
pub(crate) fn montgomery_reduce<const L: usize>(
    t_lo: &[Limb; L],
    t_hi: &[Limb; L],
    m: &[Limb; L],
    inv: Limb,
) -> [Limb; L] {
    let mut lo = *t_lo;
    let mut hi = *t_hi;
    let mut top: Limb = 0;

    for i in 0..L {
        let u = lo[i].wrapping_mul(inv);
        let mut carry = 0;
        for j in 0..L {
            let idx = i + j;
            let v = if idx < L { lo[idx] } else { hi[idx - L] };
            let (r, c) = mac(v, u, m[j], carry);
            if idx < L {
                lo[idx] = r;
            } else {
                hi[idx - L] = r;
            }
            carry = c;
        }
        // row carry enters at limb i + L and ripples upward
        let (r, mut cf) = adc(hi[i], carry, false);
        hi[i] = r;
        for j in (i + 1)..L {
            (hi[j], cf) = adc(hi[j], 0, cf);
        }
        top = top.wrapping_add(cf as Limb);
    }
    debug_assert!(top <= 1);
    debug_assert!(lo.iter().all(|&w| w == 0));

    // value = top*R + hi < 2m; subtract m when top is set or hi >= m
    let (diff, borrow) = sub_limbs(&hi, m);
    let take = Choice::from(top as u8) | !Choice::from(borrow as u8);
    select_limbs(&hi, &diff, take)
}
