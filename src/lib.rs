//! Constant-time fixed-width big integers and the prime-field arithmetic
//! built on them. Widths are compile-time parameters; the two instantiations
//! exposed at the library boundary are the 255-bit and 254-bit fields of the
//! common pairing-friendly curves.

#![no_std]
#![warn(clippy::std_instead_of_alloc, clippy::std_instead_of_core)]

pub mod bigint;
pub mod error;
pub mod field;
pub mod modulus;
pub mod secret;

mod arith;
mod barrett;
mod mont;
mod primitive;

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

pub use subtle;

pub use bigint::{BigInt, Wide};
pub use error::{Error, Result};
pub use field::Fe;
pub use modulus::{Modulus, ReductionKind};
pub use secret::SecretWord;

// Only 64-bit limbs supported now.
pub type Limb = u64;
pub const LIMB_BITS: usize = 64;
pub type DoubleLimb = u128;

pub type Big255 = BigInt<255, 4>;
pub type Big254 = BigInt<254, 4>;

pub type Fe255 = Fe<255, 4>;
pub type Fe254 = Fe<254, 4>;

pub type Modulus255 = Modulus<255, 4>;
pub type Modulus254 = Modulus<254, 4>;
