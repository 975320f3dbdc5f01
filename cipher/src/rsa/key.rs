use crate::{CipherError, Rand};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt::{Display, Formatter};
use utils::{generate_prime, BigUintExt, NumError};

/// smallest modulus size accepted by the key generator
pub const MIN_KEY_BITS: usize = 16;

/// Miller-Rabin rounds are clamped to at least this many
pub const MIN_TEST_ROUNDS: usize = 7;

const PUBLIC_EXPONENT: u32 = 65537;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
    // n = p * q
    n: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey {
    // d * e = 1 % (p-1)(q-1)
    d: BigUint,
    n: BigUint,
}

#[derive(Clone, Debug)]
pub struct KeyPair {
    pk: PublicKey,
    sk: PrivateKey,
}

/// Key generation parameters.
///
/// ```ignore
/// let pair = KeyGenerator::new(1024).test_rounds(19).generate(&mut DefaultRand::default())?;
/// ```
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    bits: usize,
    test_rounds: usize,
    prime_attempts: usize,
    exponent_attempts: usize,
}

impl PublicKey {
    /// note: not to check the `e` and `n` are right RSA parameters
    pub fn new_uncheck(e: BigUint, n: BigUint) -> Self {
        Self { e, n }
    }

    /// n
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// 每个密文块的字节长度: ceil(bits(n) / 8)
    pub fn block_len(&self) -> usize {
        (self.n.bits() as usize + 7) >> 3
    }

    /// $m^e \mod n, m \lt n$
    pub fn rsaep(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(m.modpow(&self.e, &self.n))
        } else {
            Err(CipherError::InvalidInput(format!(
                "rsaep: invalid message that need less than {}",
                self.n
            )))
        }
    }

    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.n <= BigUint::one() {
            Err(CipherError::InvalidPublicKey(format!(
                "modulus {} is too small",
                self.n
            )))
        } else if self.e.is_zero() || self.e >= self.n {
            Err(CipherError::InvalidPublicKey(format!(
                "exponent {} is out of range",
                self.e
            )))
        } else {
            Ok(())
        }
    }
}

impl PrivateKey {
    /// note: not to check the `d` and `n` are right RSA parameters
    pub fn new_uncheck(d: BigUint, n: BigUint) -> Self {
        Self { d, n }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// d
    pub fn exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn block_len(&self) -> usize {
        (self.n.bits() as usize + 7) >> 3
    }

    /// RSADP: RSA Decrypt primitive
    pub fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        if c < &self.n {
            Ok(c.modpow(&self.d, &self.n))
        } else {
            Err(CipherError::DecodeError(format!(
                "rsadp: cipher block {c} is not less than the modulus"
            )))
        }
    }

    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.n <= BigUint::one() {
            Err(CipherError::InvalidPrivateKey(format!(
                "modulus {} is too small",
                self.n
            )))
        } else if self.d.is_zero() || self.d >= self.n {
            Err(CipherError::InvalidPrivateKey(format!(
                "exponent {} is out of range",
                self.d
            )))
        } else {
            Ok(())
        }
    }

    /// whether `pk` is the public half of this key
    pub fn matches(&self, pk: &PublicKey) -> bool {
        if self.n != pk.n || self.is_valid().is_err() || pk.is_valid().is_err() {
            return false;
        }

        [0x2au32, 0xbeef]
            .into_iter()
            .map(|m| BigUint::from(m) % &self.n)
            .all(|m| {
                let c = m.modpow(&pk.e, &pk.n);
                c.modpow(&self.d, &self.n) == m
            })
    }
}

impl KeyPair {
    /// generate a key pair whose modulus has about `bits_len` bits.
    ///
    /// `prime_test_rounds` is the number of Miller-Rabin rounds for each prime, values below
    /// [`MIN_TEST_ROUNDS`] are raised to it.
    pub fn generate<R: Rand>(
        bits_len: usize,
        prime_test_rounds: usize,
        rng: &mut R,
    ) -> Result<Self, CipherError> {
        KeyGenerator::new(bits_len)
            .test_rounds(prime_test_rounds)
            .generate(rng)
    }

    pub fn from_keys(pk: PublicKey, sk: PrivateKey) -> Result<Self, CipherError> {
        if sk.matches(&pk) {
            Ok(Self { pk, sk })
        } else {
            Err(CipherError::InvalidPrivateKey(
                "the private key does not belong to the public key".to_string(),
            ))
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.sk
    }

    pub fn into_keys(self) -> (PublicKey, PrivateKey) {
        (self.pk, self.sk)
    }
}

impl KeyGenerator {
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            test_rounds: 19,
            prime_attempts: 1 << 20,
            exponent_attempts: 1 << 16,
        }
    }

    pub fn test_rounds(mut self, rounds: usize) -> Self {
        self.test_rounds = rounds.max(MIN_TEST_ROUNDS);
        self
    }

    /// budget of candidates for every prime search
    pub fn prime_attempts(mut self, attempts: usize) -> Self {
        self.prime_attempts = attempts;
        self
    }

    /// budget of odd exponents tried when 65537 is not coprime with $\phi(n)$
    pub fn exponent_attempts(mut self, attempts: usize) -> Self {
        self.exponent_attempts = attempts;
        self
    }

    pub fn generate<R: Rand>(&self, rng: &mut R) -> Result<KeyPair, CipherError> {
        let (p, q) = self.primes(rng)?;
        self.from_primes(&p, &q)
    }

    // 两个不同的`bits/2`位素数
    fn primes<R: Rand>(&self, rng: &mut R) -> Result<(BigUint, BigUint), CipherError> {
        if self.bits < MIN_KEY_BITS {
            return Err(CipherError::InvalidKeySize {
                min: MIN_KEY_BITS,
                real: self.bits,
            });
        }

        let (bits, rounds) = (self.bits >> 1, self.test_rounds.max(MIN_TEST_ROUNDS));
        let p = generate_prime(bits, rounds, self.prime_attempts, rng)?;
        let q = self.distinct_prime(&p, bits, rounds, rng)?;
        Ok((p, q))
    }

    fn from_primes(&self, p: &BigUint, q: &BigUint) -> Result<KeyPair, CipherError> {
        let n = p * q;
        let phi = (p - 1u32) * (q - 1u32);
        let e = self.public_exponent(&phi)?;
        let d = BigUintExt(&e)
            .modinv(&phi)
            .expect("e is coprime with phi(n), the inverse always exists");
        assert!(
            ((&e * &d) % &phi).is_one(),
            "key generation post-condition violated: e * d != 1 mod phi(n)"
        );

        log::debug!(
            "generated a {}-bits key pair, public exponent {}",
            n.bits(),
            e
        );

        Ok(KeyPair {
            pk: PublicKey::new_uncheck(e, n.clone()),
            sk: PrivateKey::new_uncheck(d, n),
        })
    }

    fn distinct_prime<R: Rand>(
        &self,
        p: &BigUint,
        bits: usize,
        rounds: usize,
        rng: &mut R,
    ) -> Result<BigUint, CipherError> {
        for _ in 0..self.prime_attempts.max(1) {
            let q = generate_prime(bits, rounds, self.prime_attempts, rng)?;
            if &q != p {
                return Ok(q);
            }
            log::trace!("q == p, regenerate q");
        }

        Err(NumError::GenerationTimeout {
            attempts: self.prime_attempts,
        }
        .into())
    }

    // 优先使用65537, 否则从3开始寻找与phi互质的奇数
    fn public_exponent(&self, phi: &BigUint) -> Result<BigUint, CipherError> {
        let e = BigUint::from(PUBLIC_EXPONENT);
        if &e < phi && BigUintExt(&e).gcd(phi).is_one() {
            return Ok(e);
        }

        let mut e = BigUint::from(3u32);
        for _ in 0..self.exponent_attempts {
            if &e >= phi {
                break;
            }

            if BigUintExt(&e).gcd(phi).is_one() {
                log::debug!("65537 is not usable, fall back to the public exponent {e}");
                return Ok(e);
            }
            e += 2u32;
        }

        Err(NumError::GenerationTimeout {
            attempts: self.exponent_attempts,
        }
        .into())
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.e, self.n)
    }
}

impl Display for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.d, self.n)
    }
}
