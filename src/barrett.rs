//! Barrett reduction engine, the fallback for moduli the Montgomery path
//! cannot take. The reduce path runs a fixed multiply-and-subtract sequence
//! with two always-executed conditional subtractions; only setup, which
//! handles public data, is allowed to branch.

use subtle::{Choice, ConditionallySelectable};

use crate::primitive::{adc, mac, sbb};
use crate::{LIMB_BITS, Limb};

/// Widest limb count the fixed scratch buffers support (512-bit moduli).
/// The loops below are bounded by the public limb count L, so the access
/// pattern never depends on the values being reduced.
pub(crate) const MAX_LIMBS: usize = 8;

// r (L+1 limbs) >= m (L limbs)? Setup-time path, public data.
fn r_geq_m(r: &[Limb], m: &[Limb]) -> bool {
    if r[m.len()] != 0 {
        return true;
    }
    let mut i = m.len();
    while i > 0 {
        i -= 1;
        if r[i] != m[i] {
            return r[i] > m[i];
        }
    }
    true
}

// r -= m over L+1 limbs; the caller checked r >= m.
fn r_sub_m(r: &mut [Limb], m: &[Limb]) {
    let mut borrow = false;
    for i in 0..m.len() {
        (r[i], borrow) = sbb(r[i], m[i], borrow);
    }
    let n = m.len();
    let (v, _) = sbb(r[n], 0, borrow);
    r[n] = v;
}

/// mu = floor(2^(128L) / m), L+1 limbs as (low limbs, high limb).
/// Restoring binary division; setup-time, public data.
pub(crate) fn barrett_mu<const L: usize>(m: &[Limb; L]) -> ([Limb; L], Limb) {
    debug_assert!(L <= MAX_LIMBS);
    let mut q = [0 as Limb; 2 * MAX_LIMBS + 1];
    let mut r = [0 as Limb; MAX_LIMBS + 1];

    // the dividend has a single bit, at position 128L
    let top = 2 * LIMB_BITS * L;
    let mut i = top + 1;
    while i > 0 {
        i -= 1;
        // r = 2r + bit i of the dividend
        let mut carry = i == top;
        for j in 0..=L {
            (r[j], carry) = adc(r[j], r[j], carry);
        }
        if r_geq_m(&r[..=L], m) {
            r_sub_m(&mut r[..=L], m);
            q[i / LIMB_BITS] |= (1 as Limb) << (i % LIMB_BITS);
        }
    }

    // mu < 2^(64(L+1)) because m fills its top limb past 2^(64(L-1))
    let mut mu_lo = [0; L];
    mu_lo.copy_from_slice(&q[..L]);
    for &w in &q[L + 1..] {
        debug_assert_eq!(w, 0);
    }
    (mu_lo, q[L])
}

/// x mod m, canonical in [0, m), for any 2L-limb x.
///
/// Classic Barrett: q1 = floor(x / b^(L-1)), q3 = floor(q1*mu / b^(L+1)),
/// r = (x - q3*m) mod b^(L+1). The estimate undershoots the true quotient
/// by at most two, so two conditional subtractions always finish; both run
/// unconditionally and commit through a select.
pub(crate) fn barrett_reduce<const L: usize>(
    x_lo: &[Limb; L],
    x_hi: &[Limb; L],
    m: &[Limb; L],
    mu_lo: &[Limb; L],
    mu_hi: Limb,
) -> [Limb; L] {
    debug_assert!(L <= MAX_LIMBS);
    let x_at = |i: usize| if i < L { x_lo[i] } else { x_hi[i - L] };

    // q1 = x >> 64(L-1), L+1 limbs
    let mut q1 = [0 as Limb; MAX_LIMBS + 1];
    for j in 0..=L {
        q1[j] = x_at(L - 1 + j);
    }

    let mut mu = [0 as Limb; MAX_LIMBS + 1];
    mu[..L].copy_from_slice(mu_lo);
    mu[L] = mu_hi;

    // q2 = q1 * mu, 2L+2 limbs
    let mut q2 = [0 as Limb; 2 * MAX_LIMBS + 2];
    for i in 0..=L {
        let mut carry = 0;
        for j in 0..=L {
            let (v, c) = mac(q2[i + j], q1[i], mu[j], carry);
            q2[i + j] = v;
            carry = c;
        }
        q2[i + L + 1] = carry;
    }

    // r1 = x mod b^(L+1)
    let mut r = [0 as Limb; MAX_LIMBS + 1];
    for j in 0..=L {
        r[j] = x_at(j);
    }

    // r2 = q3 * m mod b^(L+1), q3 = q2 >> 64(L+1)
    let mut r2 = [0 as Limb; MAX_LIMBS + 1];
    for i in 0..=L {
        let q3i = q2[L + 1 + i];
        let mut carry = 0;
        for j in 0..(L + 1 - i) {
            let mj = if j < L { m[j] } else { 0 };
            let (v, c) = mac(r2[i + j], q3i, mj, carry);
            r2[i + j] = v;
            carry = c;
        }
    }

    // r = r1 - r2; the true remainder is in [0, 3m), so the wrap at
    // b^(L+1) absorbs the borrow
    let mut borrow = false;
    for j in 0..=L {
        (r[j], borrow) = sbb(r[j], r2[j], borrow);
    }

    // two correcting subtractions, always executed
    for _ in 0..2 {
        let mut t = [0 as Limb; MAX_LIMBS + 1];
        let mut borrow = false;
        for j in 0..=L {
            let mj = if j < L { m[j] } else { 0 };
            (t[j], borrow) = sbb(r[j], mj, borrow);
        }
        let keep = Choice::from((!borrow) as u8);
        for j in 0..=L {
            r[j] = Limb::conditional_select(&r[j], &t[j], keep);
        }
    }
    debug_assert_eq!(r[L], 0);

    let mut out = [0; L];
    out.copy_from_slice(&r[..L]);
    out
}
