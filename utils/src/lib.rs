mod error;
pub use error::NumError;

mod biguint_ext;
pub use biguint_ext::{
    extended_gcd, gcd, generate_prime, is_probable_prime, mod_inverse, BigUintExt, SMALL_PRIMES,
};
