use crate::NumError;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::{ExtendedGcd, Integer};
use num_traits::{One, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

/// 小素数表, 用于快速排除候选数
pub const SMALL_PRIMES: [u32; 53] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241,
];

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> PartialEq<BigUint> for BigUintExt<T> {
    fn eq(&self, other: &BigUint) -> bool {
        self.deref().eq(other)
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// gcd(a, 0) = a
    pub fn gcd(&self, other: &BigUint) -> BigUint {
        Integer::gcd(self.deref(), other)
    }

    /// 返回`(g, x, y)`, 满足`self * x + other * y = g`
    pub fn extended_gcd(&self, other: &BigUint) -> (BigUint, BigInt, BigInt) {
        let a = BigInt::from(self.deref().clone());
        let ExtendedGcd { gcd, x, y, .. } = a.extended_gcd(&BigInt::from(other.clone()));
        (gcd.magnitude().clone(), x, y)
    }

    /// `self * inv = 1 mod modulus`, the result is normalized into `[0, modulus)`
    pub fn modinv(&self, modulus: &BigUint) -> Result<BigUint, NumError> {
        if modulus.is_zero() {
            return Err(NumError::NoModularInverse);
        }

        let a = BigUintExt(self.deref() % modulus);
        let (g, x, _) = a.extended_gcd(modulus);
        if !g.is_one() {
            return Err(NumError::NoModularInverse);
        }

        let m = BigInt::from(modulus.clone());
        let inv = x.mod_floor(&m);
        debug_assert_ne!(inv.sign(), Sign::Minus);
        Ok(inv.magnitude().clone())
    }

    // 生成[0..self)之间的随机数
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        let bits = self.bits() as usize;
        let mut n = vec![0u8; (bits + 7) >> 3];
        let b = bits & 7;

        loop {
            rng.rand(n.as_mut_slice());
            // 清除高于bits的位, 提高命中率
            if b != 0 {
                if let Some(x) = n.last_mut() {
                    *x &= (1u8 << b) - 1;
                }
            }

            let r = BigUint::from_bytes_le(n.as_slice());
            if self.deref() > &r {
                return r;
            }
        }
    }

    /// Some(true)/Some(false) when the small prime table decides, None otherwise.
    fn small_prime_check(&self) -> Option<bool> {
        for &p in SMALL_PRIMES.iter() {
            if self.deref() == &BigUint::from(p) {
                return Some(true);
            }

            if (self.deref() % p).is_zero() {
                return Some(false);
            }
        }

        None
    }

    /// Miller-Rabin probable prime test with `rounds` random bases in `[2, n-2]`.
    ///
    /// For an odd composite `n`, the probability that it survives all rounds is at most $4^{-rounds}$.
    pub fn probably_prime_test<R: Rand>(&self, rounds: usize, rng: &mut R) -> bool {
        let n = self.deref();
        if n <= &BigUint::one() {
            return false;
        }

        if n == &BigUint::from(2u8) || n == &BigUint::from(3u8) {
            return true;
        }

        if n.is_even() {
            return false;
        }

        if let Some(is_prime) = self.small_prime_check() {
            return is_prime;
        }

        self.miller_rabin(rounds, rng)
    }

    /// note: 内部调用函数, self是大于3的奇数
    fn miller_rabin<R: Rand>(&self, rounds: usize, rng: &mut R) -> bool {
        let n = self.deref();
        let n_m1 = n - 1u32;
        // n - 1 = d * 2^r, d为奇数
        let r = n_m1.trailing_zeros().unwrap_or(0);
        let d = &n_m1 >> r;
        // a in [2, n-2]
        let span = BigUintExt(n - 3u32);

        'witness: for _ in 0..rounds {
            let a = span.gen_random(rng) + 2u32;
            let mut x = a.modpow(&d, n);
            if x.is_one() || x == n_m1 {
                continue;
            }

            for _ in 1..r {
                x = x.modpow(&BigUint::from(2u8), n);
                if x == n_m1 {
                    continue 'witness;
                }
            }

            return false;
        }

        true
    }

    /// generate an odd number uniformly in $[2^{bits-1}, 2^{bits}-1]$ until it is a probable prime.
    ///
    /// Candidates divisible by one of `SMALL_PRIMES` are rejected before the Miller-Rabin test.
    /// At most `max_attempts` candidates are tried.
    pub fn generate_prime<R: Rand>(
        bits_len: usize,
        test_rounds: usize,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<BigUint, NumError> {
        if bits_len < 2 {
            return Err(NumError::InvalidBits(bits_len));
        }

        let (mut p, b) = (
            vec![0u8; (bits_len + 7) >> 3],
            if (bits_len & 7) == 0 { 8 } else { bits_len & 7 },
        );

        for attempt in 0..max_attempts {
            rng.rand(p.as_mut_slice());

            if let Some(x) = p.last_mut() {
                // 清除大于bits_len的位, 并设置最高位
                if b != 8 {
                    *x &= (1u8 << b) - 1;
                }
                *x |= 1 << (b - 1);
            }

            // 奇数
            if let Some(x) = p.first_mut() {
                *x |= 1;
            }

            let n = BigUintExt(BigUint::from_bytes_le(p.as_slice()));
            if n.small_prime_check() == Some(false) {
                continue;
            }

            if n.probably_prime_test(test_rounds, rng) {
                log::trace!("found a {bits_len}-bits prime after {} candidates", attempt + 1);
                return Ok(n.0);
            }
        }

        Err(NumError::GenerationTimeout {
            attempts: max_attempts,
        })
    }
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    BigUintExt(a).gcd(b)
}

pub fn extended_gcd(a: &BigUint, b: &BigUint) -> (BigUint, BigInt, BigInt) {
    BigUintExt(a).extended_gcd(b)
}

pub fn mod_inverse(e: &BigUint, m: &BigUint) -> Result<BigUint, NumError> {
    BigUintExt(e).modinv(m)
}

pub fn is_probable_prime<R: Rand>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    BigUintExt(n).probably_prime_test(rounds, rng)
}

pub fn generate_prime<R: Rand>(
    bits_len: usize,
    rounds: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BigUint, NumError> {
    BigUintExt::<BigUint>::generate_prime(bits_len, rounds, max_attempts, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Num;
    use rand::{DefaultRand, SeedRand};

    fn big(s: &str) -> BigUint {
        BigUint::from_str_radix(s, 10).expect("convert string to big uint failed")
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(&big("12"), &big("18")), big("6"));
        assert_eq!(gcd(&big("17"), &big("0")), big("17"));
        assert_eq!(gcd(&big("0"), &big("9")), big("9"));
        assert_eq!(gcd(&big("65537"), &big("3120")), big("1"));
    }

    #[test]
    fn extended_gcd_bezout() {
        let cases = [("240", "46"), ("65537", "3120"), ("7", "0"), ("1", "1"), ("99", "78")];
        for (a, b) in cases {
            let (a, b) = (big(a), big(b));
            let (g, x, y) = extended_gcd(&a, &b);
            let lhs = BigInt::from(a.clone()) * x + BigInt::from(b.clone()) * y;
            assert_eq!(lhs, BigInt::from(g.clone()), "bezout failed for {a}, {b}");
            assert_eq!(g, gcd(&a, &b));
        }
    }

    #[test]
    fn modinv_normalized() {
        // 17 * 2753 = 46801 = 15 * 3120 + 1
        assert_eq!(mod_inverse(&big("17"), &big("3120")).unwrap(), big("2753"));
        assert_eq!(mod_inverse(&big("3"), &big("11")).unwrap(), big("4"));
        // a > m
        assert_eq!(mod_inverse(&big("14"), &big("11")).unwrap(), big("4"));
        assert_eq!(mod_inverse(&big("5"), &big("1")).unwrap(), big("0"));

        let (e, m) = (big("65537"), big("1000000016000000063"));
        if let Ok(d) = mod_inverse(&e, &m) {
            assert!(d < m);
            assert!(((&e * &d) % &m).is_one());
        }
    }

    #[test]
    fn modinv_not_coprime() {
        assert_eq!(
            mod_inverse(&big("6"), &big("9")),
            Err(NumError::NoModularInverse)
        );
        assert_eq!(
            mod_inverse(&big("4"), &big("0")),
            Err(NumError::NoModularInverse)
        );
    }

    #[test]
    fn small_numbers() {
        let mut rng = SeedRand::new(3);
        let primes = [2u32, 3, 5, 7, 11, 13, 241, 251, 257, 65537];
        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p), 7, &mut rng), "{p}");
        }

        let composites = [0u32, 1, 4, 9, 15, 91, 561, 1105, 65535];
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), 7, &mut rng), "{c}");
        }
    }

    #[test]
    fn composite_validate() {
        let cases = [
            "21284175091214687912771199898307297748211672914763848041968395774954376176754",
            "82793403787388584738507275144194252681",
            // Carmichael numbers
            "3825123056546413051",
            "318665857834031151167461",
            // strong pseudoprime to prime bases 2 through 29
            "1195068768795265792518361315725116351898245581",
            "3673744903",
            "80579735209",
            "105919633",
        ];

        let mut rng = DefaultRand::default();
        for s in cases {
            assert!(
                !is_probable_prime(&big(s), 20, &mut rng),
                "composite `{s}` test failed"
            );
        }
    }

    #[test]
    fn prime_validate() {
        let cases = [
            "13756265695458089029",
            "18699199384836356663",
            "98920366548084643601728869055592650835572950932266967461790948584315647051443",
            // Curve25519: 2^255-19
            "57896044618658097711785492504343953926634992332820282019728792003956564819949",
            // E-521: 2^521-1
            "6864797660130609714981900799081393217269435300143305409394463459185543183397656052122559640661454554977296311391480858037121987999716643812574028291115057151",
        ];

        let mut rng = DefaultRand::default();
        for s in cases {
            assert!(is_probable_prime(&big(s), 10, &mut rng), "prime `{s}` test failed");
        }
    }

    #[test]
    fn gen_prime_bits() {
        let mut rng = SeedRand::new(11);
        for bits_len in [2usize, 3, 5, 8, 9, 16, 64, 128] {
            let p = BigUintExt::<BigUint>::generate_prime(bits_len, 7, 100_000, &mut rng).unwrap();
            assert_eq!(p.bits() as usize, bits_len);
            assert!(is_probable_prime(&p, 20, &mut rng));
        }
    }

    #[test]
    fn gen_prime_errors() {
        let mut rng = SeedRand::new(5);
        assert_eq!(
            BigUintExt::<BigUint>::generate_prime(1, 7, 10, &mut rng),
            Err(NumError::InvalidBits(1))
        );
        assert_eq!(
            BigUintExt::<BigUint>::generate_prime(256, 7, 0, &mut rng),
            Err(NumError::GenerationTimeout { attempts: 0 })
        );
    }

    #[test]
    fn gen_random_below() {
        let mut rng = SeedRand::new(9);
        let bound = BigUintExt(big("1000"));
        for _ in 0..500 {
            assert!(bound.gen_random(&mut rng) < big("1000"));
        }
    }
}
