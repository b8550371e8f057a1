use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::arith::{
    add_mod, ct_eq_limbs, is_zero_limbs, mul_wide_limbs, select_limbs, square_wide_limbs, sub_limbs,
    sub_mod,
};
use crate::barrett::barrett_reduce;
use crate::bigint::BigInt;
use crate::modulus::{Modulus, Reduction};
use crate::mont::montgomery_reduce;
use crate::secret::SecretWord;
use crate::Limb;

/// A field element: the canonical representative in [0, m) of its residue
/// class, held in the internal form of the owning [`Modulus`] descriptor.
///
/// Elements are secret by classification. The surface is constant-time in
/// the element value: equality is [`ConstantTimeEq`], selection and swapping
/// go through [`ConditionallySelectable`], and nothing here indexes or
/// branches on limb contents.
#[derive(Copy, Clone, Debug)]
pub struct Fe<const BITS: usize, const LIMBS: usize> {
    pub(crate) limbs: [Limb; LIMBS],
}

impl<const BITS: usize, const LIMBS: usize> Default for Fe<BITS, LIMBS> {
    fn default() -> Self {
        Fe { limbs: [0; LIMBS] }
    }
}

impl<const BITS: usize, const LIMBS: usize> Fe<BITS, LIMBS> {
    /// Zero is zero in every internal form, so this needs no descriptor.
    pub fn is_zero(&self) -> Choice {
        is_zero_limbs(&self.limbs)
    }

    /// Secret-tagged view of the internal words.
    pub fn to_secret_words(&self) -> [SecretWord; LIMBS] {
        let mut out = [SecretWord::new(0); LIMBS];
        for i in 0..LIMBS {
            out[i] = SecretWord::new(self.limbs[i]);
        }
        out
    }

    /// Rebuilds from secret words of the same descriptor and internal form.
    /// The canonical-range contract stays with the caller.
    pub fn from_secret_words(words: &[SecretWord; LIMBS]) -> Self {
        let mut limbs = [0; LIMBS];
        for i in 0..LIMBS {
            limbs[i] = words[i].0;
        }
        Fe { limbs }
    }
}

impl<const BITS: usize, const LIMBS: usize> ConditionallySelectable for Fe<BITS, LIMBS> {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fe { limbs: select_limbs(&a.limbs, &b.limbs, choice) }
    }
}

impl<const BITS: usize, const LIMBS: usize> ConstantTimeEq for Fe<BITS, LIMBS> {
    #[inline]
    fn ct_eq(&self, other: &Self) -> Choice {
        ct_eq_limbs(&self.limbs, &other.limbs)
    }
}

impl<const BITS: usize, const LIMBS: usize> PartialEq for Fe<BITS, LIMBS> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<const BITS: usize, const LIMBS: usize> Eq for Fe<BITS, LIMBS> {}

impl<const BITS: usize, const LIMBS: usize> Modulus<BITS, LIMBS> {
    fn reduce_wide(&self, lo: &[Limb; LIMBS], hi: &[Limb; LIMBS]) -> [Limb; LIMBS] {
        match &self.reduction {
            Reduction::Montgomery { inv, .. } => montgomery_reduce(lo, hi, &self.m.limbs, *inv),
            Reduction::Barrett { mu_lo, mu_hi } => {
                barrett_reduce(lo, hi, &self.m.limbs, mu_lo, *mu_hi)
            }
        }
    }

    /// a + b. One conditional correction restores the canonical range; no
    /// loops, no retries.
    pub fn add(&self, a: &Fe<BITS, LIMBS>, b: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        Fe { limbs: add_mod(&a.limbs, &b.limbs, &self.m.limbs) }
    }

    /// 2a.
    pub fn double(&self, a: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        self.add(a, a)
    }

    /// a - b, correcting by one conditional add of the modulus.
    pub fn sub(&self, a: &Fe<BITS, LIMBS>, b: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        Fe { limbs: sub_mod(&a.limbs, &b.limbs, &self.m.limbs) }
    }

    /// m - a, with zero pinned to zero by a select, not a branch.
    pub fn neg(&self, a: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        let (diff, _) = sub_limbs(&self.m.limbs, &a.limbs);
        Fe { limbs: select_limbs(&diff, &[0; LIMBS], a.is_zero()) }
    }

    /// a * b: full double-width product, then the strategy's reduction.
    pub fn mul(&self, a: &Fe<BITS, LIMBS>, b: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        let (lo, hi) = mul_wide_limbs(&a.limbs, &b.limbs);
        Fe { limbs: self.reduce_wide(&lo, &hi) }
    }

    pub fn square(&self, a: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        let (lo, hi) = square_wide_limbs(&a.limbs);
        Fe { limbs: self.reduce_wide(&lo, &hi) }
    }

    pub fn square_n(&self, a: &Fe<BITS, LIMBS>, n: usize) -> Fe<BITS, LIMBS> {
        let mut out = *a;
        for _ in 0..n {
            out = self.square(&out);
        }
        out
    }

    /// base^exp by Montgomery ladder. The same square/multiply sequence runs
    /// for every exponent value; only the exponent type's public bit width
    /// sets the loop count, so the exponent may be secret.
    pub fn pow<const EB: usize, const EL: usize>(
        &self,
        base: &Fe<BITS, LIMBS>,
        exp: &BigInt<EB, EL>,
    ) -> Fe<BITS, LIMBS> {
        let mut r0 = self.one();
        let mut r1 = *base;
        let mut i = EB;
        while i > 0 {
            i -= 1;
            let bit = Choice::from(exp.bit(i) as u8);
            Fe::conditional_swap(&mut r0, &mut r1, bit);
            r1 = self.mul(&r0, &r1);
            r0 = self.square(&r0);
            Fe::conditional_swap(&mut r0, &mut r1, bit);
        }
        r0
    }

    /// Square-and-multiply that skips work on zero exponent bits. The
    /// exponent must be public; the base still never steers control flow.
    pub fn pow_vartime<const EB: usize, const EL: usize>(
        &self,
        base: &Fe<BITS, LIMBS>,
        exp: &BigInt<EB, EL>,
    ) -> Fe<BITS, LIMBS> {
        let mut acc = self.one();
        let mut i = exp.bit_len();
        while i > 0 {
            i -= 1;
            acc = self.square(&acc);
            if exp.bit(i) {
                acc = self.mul(&acc, base);
            }
        }
        acc
    }

    /// a^-1 = a^(m-2), valid for prime moduli. The exponent is public, the
    /// base never influences control flow. Maps zero to zero.
    pub fn invert(&self, a: &Fe<BITS, LIMBS>) -> Fe<BITS, LIMBS> {
        let (e, _) = self.m.sub(&BigInt::from_u64(2));
        self.pow_vartime(a, &e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Big254, Big255, Modulus254, Modulus255};
    use hex_literal::hex;
    use num::BigUint;

    const R255: [u8; 32] = hex!("73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001");
    const R254: [u8; 32] = hex!("30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001");

    fn get_prime() -> BigUint {
        BigUint::from_bytes_be(&R255)
    }

    fn modulus_255() -> Modulus255 {
        Modulus255::new(Big255::from_be_slice(&R255).unwrap()).unwrap()
    }

    fn to_biguint(el: &[u64]) -> BigUint {
        let mut res = BigUint::default();
        let n = el.len();
        for i in 0..n {
            res <<= 64;
            res += el[n - 1 - i];
        }
        res
    }

    fn canon(m: &Modulus255, a: &Fe<255, 4>) -> BigUint {
        to_biguint(&m.fe_to_bigint(a).limbs)
    }

    #[test]
    fn test_concrete_scenario() {
        // fixed small values on the 255-bit field
        let m = modulus_255();
        let two = m.fe_from_u64(2).unwrap();
        let three = m.fe_from_u64(3).unwrap();
        let six = m.fe_from_u64(6).unwrap();
        assert_eq!(m.mul(&two, &three), six);

        // 2 + (p - 1) wraps exactly once
        let p_minus_1 = m.sub(&m.zero(), &m.one());
        assert_eq!(m.add(&two, &p_minus_1), m.one());

        assert_eq!(m.invert(&m.one()), m.one());

        let inv2 = m.invert(&two);
        assert_eq!(m.mul(&two, &inv2), m.one());
    }

    #[test]
    fn test_add_fuzzy() {
        let m = modulus_255();
        let p = get_prime();
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let a = m.random_fe(&mut rng);
            let b = m.random_fe(&mut rng);
            let c = m.add(&a, &b);
            assert_eq!(canon(&m, &c), (canon(&m, &a) + canon(&m, &b)) % &p);
            // and canonical: strictly below the modulus
            assert!(canon(&m, &c) < p);
        }
    }

    #[test]
    fn test_sub_add_inverse() {
        let m = modulus_255();
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let a = m.random_fe(&mut rng);
            let b = m.random_fe(&mut rng);
            let c = m.add(&a, &b);
            assert_eq!(m.sub(&c, &a), b);
        }
    }

    #[test]
    fn test_mul_fuzzy() {
        let m = modulus_255();
        let p = get_prime();
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let a = m.random_fe(&mut rng);
            let b = m.random_fe(&mut rng);
            let c = m.mul(&a, &b);
            assert_eq!(canon(&m, &c), (canon(&m, &a) * canon(&m, &b)) % &p);
        }
    }

    #[test]
    fn test_square_fuzzy() {
        let m = modulus_255();
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let a = m.random_fe(&mut rng);
            assert_eq!(m.square(&a), m.mul(&a, &a));
        }
        // square_n is iterated squaring
        let a = m.random_fe(&mut rng);
        let mut want = a;
        for _ in 0..7 {
            want = m.square(&want);
        }
        assert_eq!(m.square_n(&a, 7), want);
    }

    #[test]
    fn test_group_laws() {
        let m = modulus_255();
        let mut rng = rand::rng();
        for _ in 0..500 {
            let a = m.random_fe(&mut rng);
            let b = m.random_fe(&mut rng);
            let c = m.random_fe(&mut rng);
            assert_eq!(m.add(&a, &b), m.add(&b, &a));
            assert_eq!(m.add(&m.add(&a, &b), &c), m.add(&a, &m.add(&b, &c)));
            assert_eq!(m.mul(&a, &b), m.mul(&b, &a));
            assert_eq!(m.mul(&m.mul(&a, &b), &c), m.mul(&a, &m.mul(&b, &c)));
            assert_eq!(m.mul(&a, &m.add(&b, &c)), m.add(&m.mul(&a, &b), &m.mul(&a, &c)));
        }
    }

    #[test]
    fn test_neg() {
        let m = modulus_255();
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let a = m.random_fe(&mut rng);
            assert_eq!(m.add(&a, &m.neg(&a)), m.zero());
            assert_eq!(m.neg(&m.neg(&a)), a);
        }
        // negation of zero stays canonical zero
        assert_eq!(m.neg(&m.zero()), m.zero());
        assert!(bool::from(m.neg(&m.zero()).is_zero()));
    }

    #[test]
    fn test_invert_fuzzy() {
        let m = modulus_255();
        let mut rng = rand::rng();
        for _ in 0..200 {
            let a = m.random_fe(&mut rng);
            if bool::from(a.is_zero()) {
                continue;
            }
            assert_eq!(m.mul(&a, &m.invert(&a)), m.one());
        }
        assert_eq!(m.invert(&m.zero()), m.zero());
    }

    #[test]
    fn test_pow_matches_oracle() {
        let m = modulus_255();
        let p = get_prime();
        let mut rng = rand::rng();
        for _ in 0..50 {
            let a = m.random_fe(&mut rng);
            let e_fe = m.random_fe(&mut rng);
            let e = m.fe_to_bigint(&e_fe);

            let want = canon(&m, &a).modpow(&to_biguint(&e.limbs), &p);
            assert_eq!(canon(&m, &m.pow(&a, &e)), want);
            // the ladder and the public-exponent path agree
            assert_eq!(m.pow(&a, &e), m.pow_vartime(&a, &e));
        }
        // edge exponents
        let a = m.random_fe(&mut rng);
        assert_eq!(m.pow(&a, &Big255::ZERO), m.one());
        assert_eq!(m.pow(&a, &Big255::ONE), a);
    }

    #[test]
    fn test_strategies_agree() {
        let p = Big255::from_be_slice(&R255).unwrap();
        let mont = Modulus255::montgomery(p).unwrap();
        let barr = Modulus255::barrett(p).unwrap();
        let mut rng = rand::rng();
        for _ in 0..500 {
            let x = mont.random_fe(&mut rng);
            let y = mont.random_fe(&mut rng);
            let (xb, yb) = (
                barr.fe_from_bigint(&mont.fe_to_bigint(&x)).unwrap(),
                barr.fe_from_bigint(&mont.fe_to_bigint(&y)).unwrap(),
            );

            assert_eq!(mont.fe_to_bigint(&mont.add(&x, &y)), barr.fe_to_bigint(&barr.add(&xb, &yb)));
            assert_eq!(mont.fe_to_bigint(&mont.sub(&x, &y)), barr.fe_to_bigint(&barr.sub(&xb, &yb)));
            assert_eq!(mont.fe_to_bigint(&mont.mul(&x, &y)), barr.fe_to_bigint(&barr.mul(&xb, &yb)));
            assert_eq!(mont.fe_to_bigint(&mont.invert(&x)), barr.fe_to_bigint(&barr.invert(&xb)));
        }
    }

    #[test]
    fn test_even_modulus_ring_ops() {
        // 2^254 - 4: the barrett fallback carries the ring operations
        let even = Big254::from_limbs([!0 - 3, !0, !0, (1 << 62) - 1]).unwrap();
        let m = Modulus254::new(even).unwrap();
        let p = (BigUint::from(1u8) << 254) - 4u8;
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let a = m.random_fe(&mut rng);
            let b = m.random_fe(&mut rng);
            let av = to_biguint(&m.fe_to_bigint(&a).limbs);
            let bv = to_biguint(&m.fe_to_bigint(&b).limbs);
            assert_eq!(to_biguint(&m.fe_to_bigint(&m.add(&a, &b)).limbs), (&av + &bv) % &p);
            assert_eq!(to_biguint(&m.fe_to_bigint(&m.mul(&a, &b)).limbs), (&av * &bv) % &p);
        }
    }

    #[test]
    fn test_254_bit_field() {
        let m = Modulus254::new(Big254::from_be_slice(&R254).unwrap()).unwrap();
        let p = BigUint::from_bytes_be(&R254);
        let mut rng = rand::rng();
        for _ in 0..500 {
            let a = m.random_fe(&mut rng);
            let b = m.random_fe(&mut rng);
            let av = to_biguint(&m.fe_to_bigint(&a).limbs);
            let bv = to_biguint(&m.fe_to_bigint(&b).limbs);
            let c = m.mul(&a, &b);
            assert_eq!(to_biguint(&m.fe_to_bigint(&c).limbs), (&av * &bv) % &p);
            assert!(to_biguint(&m.fe_to_bigint(&c).limbs) < p);
        }
        let two = m.fe_from_u64(2).unwrap();
        assert_eq!(m.mul(&two, &m.invert(&two)), m.one());
    }

    #[test]
    fn test_conditional_ops() {
        let m = modulus_255();
        let mut rng = rand::rng();
        let a = m.random_fe(&mut rng);
        let b = m.random_fe(&mut rng);

        assert_eq!(Fe::conditional_select(&a, &b, Choice::from(0)), a);
        assert_eq!(Fe::conditional_select(&a, &b, Choice::from(1)), b);

        let (mut x, mut y) = (a, b);
        Fe::conditional_swap(&mut x, &mut y, Choice::from(0));
        assert_eq!((x, y), (a, b));
        Fe::conditional_swap(&mut x, &mut y, Choice::from(1));
        assert_eq!((x, y), (b, a));
    }

    #[test]
    fn test_secret_word_round_trip() {
        let m = modulus_255();
        let mut rng = rand::rng();
        let a = m.random_fe(&mut rng);
        let words = a.to_secret_words();
        assert_eq!(Fe::from_secret_words(&words), a);
    }
}
