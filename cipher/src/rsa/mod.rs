//! RSA
//!
//! - 随机选择两个不同的素数$p$和$q$, 模数$n=p*q$, $\phi(n)=(p-1)(q-1)$;
//! - 公钥指数$e$优先取$65537$, 要求$1 \lt e \lt \phi(n)$且$gcd(e, \phi(n))=1$;
//! - 私钥指数$d$满足: $e*d \equiv 1 \mod \phi(n)$;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $x = y ^ d \mod n$;
//!
//! The message layer ([`SaltedEncrypt`] / [`SaltedDecrypt`]) interleaves a salt into the text,
//! prefixes a shared IV, base64 encodes it and then encrypts every byte of the encoded text as
//! one fixed width big-endian block.

mod key;
pub use key::{KeyGenerator, KeyPair, PrivateKey, PublicKey, MIN_KEY_BITS, MIN_TEST_ROUNDS};

mod salted;
pub use salted::{decrypt, encrypt, SaltedDecrypt, SaltedEncrypt, DEFAULT_IV};
