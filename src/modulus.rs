use rand::Rng;

use crate::arith::{ct_lt_limbs, mul_wide_limbs};
use crate::barrett::{MAX_LIMBS, barrett_mu};
use crate::bigint::BigInt;
use crate::error::{Error, Result};
use crate::field::Fe;
use crate::Limb;
use crate::mont::{mont_constants, montgomery_reduce, neg_inv_word};

/// Reduction strategy, fixed per modulus at setup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReductionKind {
    Montgomery,
    Barrett,
}

#[derive(Clone, Debug)]
pub(crate) enum Reduction<const BITS: usize, const LIMBS: usize> {
    /// Odd moduli: division-free REDC with a precomputed word inverse.
    Montgomery {
        /// -m^-1 mod 2^64
        inv: Limb,
        /// R mod m, the internal form of 1
        one: [Limb; LIMBS],
        /// R^2 mod m, carries values into the internal form
        rr: [Limb; LIMBS],
    },
    Barrett {
        /// floor(2^(128 LIMBS) / m), low limbs plus the high word
        mu_lo: [Limb; LIMBS],
        mu_hi: Limb,
    },
}

/// A public modulus and its precomputed reduction constants.
///
/// Immutable once built; share it by reference across threads at will. Every
/// field operation goes through a descriptor, and elements of one descriptor
/// mean nothing under another.
#[derive(Clone, Debug)]
pub struct Modulus<const BITS: usize, const LIMBS: usize> {
    pub(crate) m: BigInt<BITS, LIMBS>,
    pub(crate) reduction: Reduction<BITS, LIMBS>,
}

impl<const BITS: usize, const LIMBS: usize> Modulus<BITS, LIMBS> {
    /// Builds a descriptor, choosing Montgomery for odd moduli and the
    /// Barrett fallback otherwise.
    pub fn new(m: BigInt<BITS, LIMBS>) -> Result<Self> {
        if m.is_odd() { Self::montgomery(m) } else { Self::barrett(m) }
    }

    /// Montgomery-only setup; the modulus must be odd.
    pub fn montgomery(m: BigInt<BITS, LIMBS>) -> Result<Self> {
        Self::check(&m)?;
        if !m.is_odd() {
            return Err(Error::EvenModulus);
        }
        let inv = neg_inv_word(m.limbs[0]);
        let (one, rr) = mont_constants(&m.limbs);
        Ok(Modulus { m, reduction: Reduction::Montgomery { inv, one, rr } })
    }

    /// Barrett-only setup; any modulus that passes the width check works.
    pub fn barrett(m: BigInt<BITS, LIMBS>) -> Result<Self> {
        Self::check(&m)?;
        if LIMBS > MAX_LIMBS {
            return Err(Error::UnsupportedModulus);
        }
        let (mu_lo, mu_hi) = barrett_mu(&m.limbs);
        Ok(Modulus { m, reduction: Reduction::Barrett { mu_lo, mu_hi } })
    }

    // The modulus must fill its declared bit width and not be a power of
    // two; both reduction bounds rest on that.
    fn check(m: &BigInt<BITS, LIMBS>) -> Result<()> {
        if m.bit_len() != BITS || m.count_ones() == 1 {
            return Err(Error::UnsupportedModulus);
        }
        Ok(())
    }

    pub fn modulus(&self) -> &BigInt<BITS, LIMBS> {
        &self.m
    }

    pub fn kind(&self) -> ReductionKind {
        match self.reduction {
            Reduction::Montgomery { .. } => ReductionKind::Montgomery,
            Reduction::Barrett { .. } => ReductionKind::Barrett,
        }
    }

    pub fn zero(&self) -> Fe<BITS, LIMBS> {
        Fe { limbs: [0; LIMBS] }
    }

    pub fn one(&self) -> Fe<BITS, LIMBS> {
        match &self.reduction {
            Reduction::Montgomery { one, .. } => Fe { limbs: *one },
            Reduction::Barrett { .. } => {
                let mut limbs = [0; LIMBS];
                limbs[0] = 1;
                Fe { limbs }
            }
        }
    }

    /// Imports a canonical integer as a field element. Values at or above
    /// the modulus are rejected here, once, so the arithmetic itself never
    /// has to re-validate.
    pub fn fe_from_bigint(&self, v: &BigInt<BITS, LIMBS>) -> Result<Fe<BITS, LIMBS>> {
        if !bool::from(v.ct_lt(&self.m)) {
            return Err(Error::NotCanonical);
        }
        Ok(self.to_internal(&v.limbs))
    }

    pub fn fe_from_u64(&self, v: u64) -> Result<Fe<BITS, LIMBS>> {
        self.fe_from_bigint(&BigInt::from_u64(v))
    }

    pub fn fe_from_be_slice(&self, bytes: &[u8]) -> Result<Fe<BITS, LIMBS>> {
        self.fe_from_bigint(&BigInt::from_be_slice(bytes)?)
    }

    pub fn fe_from_le_slice(&self, bytes: &[u8]) -> Result<Fe<BITS, LIMBS>> {
        self.fe_from_bigint(&BigInt::from_le_slice(bytes)?)
    }

    /// The canonical representative in [0, m).
    pub fn fe_to_bigint(&self, a: &Fe<BITS, LIMBS>) -> BigInt<BITS, LIMBS> {
        match &self.reduction {
            Reduction::Montgomery { inv, .. } => {
                BigInt { limbs: montgomery_reduce(&a.limbs, &[0; LIMBS], &self.m.limbs, *inv) }
            }
            Reduction::Barrett { .. } => BigInt { limbs: a.limbs },
        }
    }

    pub fn fe_write_be(&self, a: &Fe<BITS, LIMBS>, out: &mut [u8]) -> Result<()> {
        self.fe_to_bigint(a).write_be(out)
    }

    pub fn fe_write_le(&self, a: &Fe<BITS, LIMBS>, out: &mut [u8]) -> Result<()> {
        self.fe_to_bigint(a).write_le(out)
    }

    /// Uniform element of [0, m) by rejection; the retry count leaks
    /// nothing about the value kept.
    pub fn random_fe<R: Rng + ?Sized>(&self, rng: &mut R) -> Fe<BITS, LIMBS> {
        loop {
            let mut limbs = [0; LIMBS];
            for l in limbs.iter_mut() {
                *l = rng.random();
            }
            limbs[LIMBS - 1] &= BigInt::<BITS, LIMBS>::TOP_MASK;
            if bool::from(ct_lt_limbs(&limbs, &self.m.limbs)) {
                return self.to_internal(&limbs);
            }
        }
    }

    // canonical limbs -> internal form
    pub(crate) fn to_internal(&self, limbs: &[Limb; LIMBS]) -> Fe<BITS, LIMBS> {
        match &self.reduction {
            Reduction::Montgomery { inv, rr, .. } => {
                let (lo, hi) = mul_wide_limbs(limbs, rr);
                Fe { limbs: montgomery_reduce(&lo, &hi, &self.m.limbs, *inv) }
            }
            Reduction::Barrett { .. } => Fe { limbs: *limbs },
        }
    }
}
