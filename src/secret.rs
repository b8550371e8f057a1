use core::fmt;

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::Limb;

/// A machine word carrying secret data.
///
/// Secret words only flow through constant-time operations: selection and
/// swapping take a [`Choice`], equality comes back as a [`Choice`], and
/// there is no ordering. Public words (moduli, curve constants, loop
/// bounds) stay bare [`Limb`]s and may be branched on freely.
///
/// The tag is type-level only; the wrapper is `#[repr(transparent)]` and
/// costs nothing at runtime.
#[derive(Copy, Clone, Default)]
#[repr(transparent)]
pub struct SecretWord(pub(crate) Limb);

impl SecretWord {
    #[inline]
    pub const fn new(w: Limb) -> Self {
        SecretWord(w)
    }

    /// Declassifies the word. From here on the caller owns the
    /// side-channel contract.
    #[inline]
    pub const fn expose(self) -> Limb {
        self.0
    }
}

impl From<Limb> for SecretWord {
    #[inline]
    fn from(w: Limb) -> Self {
        SecretWord(w)
    }
}

impl ConditionallySelectable for SecretWord {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        SecretWord(Limb::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for SecretWord {
    #[inline]
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

// Redacted; secret material stays out of formatted output.
impl fmt::Debug for SecretWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretWord(..)")
    }
}
