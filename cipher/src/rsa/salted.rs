//! Salted per-byte RSA message encryption.
//!
//! encrypt:
//! 1. `m0 s0 m1 s1 ...`, salt characters interleaved after every message character;
//! 2. `iv || salted`;
//! 3. base64(utf8(...));
//! 4. every byte `v` of the base64 text -> `v^e mod n` as `block_len` big-endian bytes;
//! 5. base64 of all blocks.
//!
//! decrypt runs the steps backwards and checks the IV prefix.

use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, Decrypt, Encrypt};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::collections::HashMap;

/// IV shared by both ends when nothing else is agreed on
pub const DEFAULT_IV: &str = "4O6g9trUcd4C3DnQ";

#[derive(Clone, Debug)]
pub struct SaltedEncrypt {
    key: PublicKey,
    salt: Vec<char>,
    iv: String,
}

#[derive(Clone, Debug)]
pub struct SaltedDecrypt {
    key: PrivateKey,
    iv: String,
}

impl SaltedEncrypt {
    pub fn new(key: PublicKey, salt: &str, iv: &str) -> Result<Self, CipherError> {
        if salt.is_empty() {
            return Err(CipherError::InvalidSalt);
        }

        key.is_valid()?;

        Ok(Self {
            key,
            salt: salt.chars().collect(),
            iv: iv.to_string(),
        })
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    // iv || m0 s0 m1 s1 ...
    fn frame(&self, msg: &str) -> String {
        let mut framed = String::with_capacity(self.iv.len() + msg.len() * 2);
        framed.push_str(&self.iv);
        for (c, s) in msg.chars().zip(self.salt.iter().cycle()) {
            framed.push(c);
            framed.push(*s);
        }
        framed
    }

    /// length of the ciphertext `encrypt_str(msg)` returns
    pub fn ciphertext_len(&self, msg: &str) -> usize {
        let framed = msg
            .chars()
            .zip(self.salt.iter().cycle())
            .fold(self.iv.len(), |n, (c, s)| n + c.len_utf8() + s.len_utf8());

        let b64_len = |n: usize| n.div_ceil(3) * 4;
        b64_len(b64_len(framed) * self.key.block_len())
    }

    pub fn encrypt_str(&self, msg: &str) -> Result<String, CipherError> {
        let mut buf = Vec::with_capacity(self.ciphertext_len(msg));
        self.encrypt(msg.as_bytes(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| CipherError::DecodeError(e.to_string()))
    }
}

impl Encrypt for SaltedEncrypt {
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        let msg = std::str::from_utf8(plaintext)
            .map_err(|e| CipherError::InvalidInput(format!("the message is not UTF-8: {e}")))?;

        let encoded = STANDARD.encode(self.frame(msg));
        let klen = self.key.block_len();

        // base64字符最多64种, 缓存每个字节的密文块
        let mut cache: HashMap<u8, Vec<u8>> = HashMap::with_capacity(65);
        let mut blocks = Vec::with_capacity(encoded.len() * klen);
        for v in encoded.bytes() {
            if !cache.contains_key(&v) {
                let m = BigUint::from(v);
                if &m >= self.key.modulus() {
                    return Err(CipherError::MessageOutOfRange { value: v });
                }

                let c = self.key.rsaep(&m)?.to_bytes_be();
                let mut block = vec![0u8; klen - c.len()];
                block.extend_from_slice(&c);
                cache.insert(v, block);
            }

            if let Some(block) = cache.get(&v) {
                blocks.extend_from_slice(block);
            }
        }

        ciphertext.extend_from_slice(STANDARD.encode(&blocks).as_bytes());
        Ok(())
    }
}

impl SaltedDecrypt {
    pub fn new(key: PrivateKey, iv: &str) -> Result<Self, CipherError> {
        key.is_valid()?;

        Ok(Self {
            key,
            iv: iv.to_string(),
        })
    }

    pub fn decrypt_str(&self, ciphertext: &str) -> Result<String, CipherError> {
        let mut buf = Vec::with_capacity(ciphertext.len() / 4);
        self.decrypt(ciphertext.as_bytes(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| CipherError::DecodeError(e.to_string()))
    }

    fn decrypt_blocks(&self, blocks: &[u8]) -> Result<Vec<u8>, CipherError> {
        let klen = self.key.block_len();
        if blocks.len() % klen != 0 {
            return Err(CipherError::DecodeError(format!(
                "ciphertext length `{}` is not a multiple of the block size `{klen}`",
                blocks.len()
            )));
        }

        let mut cache: HashMap<&[u8], u8> = HashMap::new();
        let mut encoded = Vec::with_capacity(blocks.len() / klen);
        for block in blocks.chunks_exact(klen) {
            let v = match cache.get(block) {
                Some(&v) => v,
                None => {
                    let m = self.key.rsadp(&BigUint::from_bytes_be(block))?;
                    let v = m.to_u8().ok_or_else(|| {
                        CipherError::DecodeError("a decrypted block is not a single byte".to_string())
                    })?;
                    cache.insert(block, v);
                    v
                }
            };
            encoded.push(v);
        }

        Ok(encoded)
    }
}

impl Decrypt for SaltedDecrypt {
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError> {
        let cleaned = ciphertext
            .iter()
            .copied()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<Vec<_>>();
        let blocks = STANDARD
            .decode(cleaned)
            .map_err(|e| CipherError::DecodeError(format!("ciphertext is not base64: {e}")))?;

        let encoded = self.decrypt_blocks(&blocks)?;
        let framed = STANDARD
            .decode(encoded)
            .map_err(|e| CipherError::DecodeError(format!("inner payload is not base64: {e}")))?;
        let framed = String::from_utf8(framed)
            .map_err(|e| CipherError::DecodeError(format!("inner payload is not UTF-8: {e}")))?;

        let salted = framed
            .strip_prefix(self.iv.as_str())
            .ok_or(CipherError::IvMismatch)?;

        // 偶数位置是原文, 奇数位置是盐
        let mut buf = [0u8; 4];
        for c in salted.chars().step_by(2) {
            plaintext.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }

        Ok(())
    }
}

pub fn encrypt(message: &str, key: &PublicKey, salt: &str, iv: &str) -> Result<String, CipherError> {
    SaltedEncrypt::new(key.clone(), salt, iv)?.encrypt_str(message)
}

pub fn decrypt(ciphertext: &str, key: &PrivateKey, iv: &str) -> Result<String, CipherError> {
    SaltedDecrypt::new(key.clone(), iv)?.decrypt_str(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::KeyPair;
    use crate::{Rand, SeedRand};
    use num_traits::Num;

    fn big(s: &str) -> BigUint {
        BigUint::from_str_radix(s, 10).unwrap()
    }

    // p = 1000003, q = 1000033
    fn fixed_keys() -> (PublicKey, PrivateKey) {
        let n = big("1000036000099");
        (
            PublicKey::new_uncheck(BigUint::from(65537u32), n.clone()),
            PrivateKey::new_uncheck(big("983264276609"), n),
        )
    }

    #[test]
    fn known_answer() {
        let (pk, sk) = fixed_keys();
        let expect = "QEL5YD4fzPLFJsKtZN506HRAil4fGCGtCQGVUoPSD3eU1Bvjp4WPEd/iSk6bD3eU1BvjBL1grzxOhDw9HxghrQl5kDfCuTTn5OkKeZA3wrmeHB7qrOOnhY8RNOfk6QrYQFXHNKH+wBAYKD934X1WXnLJvQmWolE2ChfIcgNQ7Dw17iB7XPhncbJaclY=";

        assert_eq!(encrypt("hi", &pk, "xy", DEFAULT_IV).unwrap(), expect);
        assert_eq!(decrypt(expect, &sk, DEFAULT_IV).unwrap(), "hi");
    }

    #[test]
    fn scenario_512_bits() {
        let mut rng = SeedRand::new(0x4869);
        let pair = KeyPair::generate(512, 7, &mut rng).unwrap();
        let (pk, sk) = (pair.public_key(), pair.private_key());

        let cipher = encrypt("hi", pk, "xy", DEFAULT_IV).unwrap();
        assert!(cipher.is_ascii());

        // "4O6g9trUcd4C3DnQhxiy" is 20 bytes, 28 base64 characters
        let blocks = STANDARD.decode(&cipher).unwrap();
        assert_eq!(blocks.len(), 28 * pk.block_len());
        assert_eq!(decrypt(&cipher, sk, DEFAULT_IV).unwrap(), "hi");
    }

    #[test]
    fn round_trip_messages() {
        let (pk, sk) = fixed_keys();
        let cases = [
            ("a", "s"),
            ("hello world", "xy"),
            ("Bonjour, ça va ? 🔐", "sel"),
            ("line1\nline2\ttab", "0123456789abcdef"),
            ("短文本", "盐"),
        ];

        for (msg, salt) in cases {
            let cipher = encrypt(msg, &pk, salt, DEFAULT_IV).unwrap();
            assert_eq!(decrypt(&cipher, &sk, DEFAULT_IV).unwrap(), msg, "case {msg}");
        }
    }

    #[test]
    fn exact_ciphertext_len() {
        let (pk, _) = fixed_keys();
        let enc = SaltedEncrypt::new(pk, "xy", DEFAULT_IV).unwrap();
        // 20 bytes -> 28 base64 -> 140 block bytes -> 188
        assert_eq!(enc.ciphertext_len("hi"), 188);

        let enc = SaltedEncrypt::new(enc.key().clone(), "盐s", DEFAULT_IV).unwrap();
        for msg in ["a", "hello world", "Bonjour, ça va ? 🔐", "短文本"] {
            let cipher = enc.encrypt_str(msg).unwrap();
            assert_eq!(cipher.len(), enc.ciphertext_len(msg), "case {msg}");
        }
    }

    #[test]
    fn round_trip_random_salt() {
        let mut rng = SeedRand::new(99);
        let pair = KeyPair::generate(128, 7, &mut rng).unwrap();
        for len in [1usize, 3, 16, 40] {
            let salt = rng.rand_alphanumeric(len);
            let msg = rng.rand_alphanumeric(len * 2 + 1);
            let enc = SaltedEncrypt::new(pair.public_key().clone(), &salt, "iv").unwrap();
            let dec = SaltedDecrypt::new(pair.private_key().clone(), "iv").unwrap();
            let cipher = enc.encrypt_str(&msg).unwrap();
            assert_eq!(dec.decrypt_str(&cipher).unwrap(), msg);
        }
    }

    #[test]
    fn trait_appends_without_clearing() {
        let (pk, sk) = fixed_keys();
        let enc = SaltedEncrypt::new(pk, "xy", DEFAULT_IV).unwrap();
        let dec = SaltedDecrypt::new(sk, DEFAULT_IV).unwrap();

        let mut cipher = Vec::new();
        enc.encrypt("abc".as_bytes(), &mut cipher).unwrap();
        let mut plain = b"> ".to_vec();
        dec.decrypt(&cipher, &mut plain).unwrap();
        assert_eq!(plain, b"> abc");
    }

    #[test]
    fn whitespace_in_ciphertext_is_ignored() {
        let (pk, sk) = fixed_keys();
        let cipher = encrypt("wrapped", &pk, "xy", DEFAULT_IV).unwrap();
        let (a, b) = cipher.split_at(cipher.len() / 2);
        let wrapped = format!("{a}\n  {b}\n");
        assert_eq!(decrypt(&wrapped, &sk, DEFAULT_IV).unwrap(), "wrapped");
    }

    #[test]
    fn empty_salt_rejected() {
        let (pk, _) = fixed_keys();
        assert_eq!(
            encrypt("hi", &pk, "", DEFAULT_IV).unwrap_err(),
            CipherError::InvalidSalt
        );
    }

    #[test]
    fn byte_out_of_range() {
        // n = 5 * 7 = 35, every base64 character is larger
        let pk = PublicKey::new_uncheck(BigUint::from(5u32), BigUint::from(35u32));
        assert!(matches!(
            encrypt("hi", &pk, "xy", DEFAULT_IV),
            Err(CipherError::MessageOutOfRange { .. })
        ));
    }

    #[test]
    fn iv_mismatch() {
        let (pk, sk) = fixed_keys();
        let cipher = encrypt("hi", &pk, "xy", DEFAULT_IV).unwrap();
        assert_eq!(
            decrypt(&cipher, &sk, "another-iv").unwrap_err(),
            CipherError::IvMismatch
        );
    }

    #[test]
    fn invalid_base64() {
        let (_, sk) = fixed_keys();
        assert!(matches!(
            decrypt("not base64 !!", &sk, DEFAULT_IV),
            Err(CipherError::DecodeError(_))
        ));
        // 4 bytes, not a multiple of the 5 bytes block
        assert!(matches!(
            decrypt("AAAAAA==", &sk, DEFAULT_IV),
            Err(CipherError::DecodeError(_))
        ));
    }

    #[test]
    fn wrong_private_key() {
        let mut rng = SeedRand::new(2024);
        let (a, b) = (
            KeyPair::generate(128, 7, &mut rng).unwrap(),
            KeyPair::generate(128, 7, &mut rng).unwrap(),
        );
        let cipher = encrypt("secret", a.public_key(), "xy", DEFAULT_IV).unwrap();
        let err = decrypt(&cipher, b.private_key(), DEFAULT_IV).unwrap_err();
        assert!(matches!(
            err,
            CipherError::DecodeError(_) | CipherError::IvMismatch
        ));
    }

    #[test]
    fn tamper_detection() {
        let mut rng = SeedRand::new(77);
        let pair = KeyPair::generate(64, 7, &mut rng).unwrap();
        let msg = "attack at dawn";
        let cipher = encrypt(msg, pair.public_key(), "xy", DEFAULT_IV).unwrap();
        let raw = STANDARD.decode(&cipher).unwrap();

        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let tampered = STANDARD.encode(&tampered);
            match decrypt(&tampered, pair.private_key(), DEFAULT_IV) {
                Ok(plain) => assert_ne!(plain, msg, "flipping byte {i} was not detected"),
                Err(e) => assert!(
                    matches!(e, CipherError::DecodeError(_) | CipherError::IvMismatch),
                    "unexpected error {e}"
                ),
            }
        }
    }
}
