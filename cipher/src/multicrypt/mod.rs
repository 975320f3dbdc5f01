//! MultiCrypt, the passphrase based text cipher protecting private keys at rest.
//!
//! wrap:
//! - `fingerprint(key) || plaintext`;
//! - 每个字符后插入一个由密钥和位置决定的诱饵字符;
//! - 按`block_size`分块, 每块逆序;
//! - 第`i`个字符异或`key[i % len]`, 再模`0x10000`;
//! - URL-safe base64, 无填充.
//!
//! unwrap runs the steps backwards, then compares the fingerprint.

mod codec;

use crate::{CipherError, KeyWrap};

const FINGERPRINT_LEN: usize = 10;

#[derive(Clone, Copy, Debug, Default)]
pub struct MultiCrypt;

struct KeyValues {
    chars: Vec<char>,
    block_size: usize,
    fingerprint: String,
}

impl KeyValues {
    fn new(key: &str) -> Result<Self, CipherError> {
        let chars = key.chars().collect::<Vec<_>>();
        if chars.is_empty() {
            return Err(CipherError::InvalidInput("the key can not be empty".to_string()));
        }

        let sum = chars.iter().map(|&c| c as usize).sum::<usize>();
        let fingerprint = (0..FINGERPRINT_LEN)
            .map(|i| {
                let c = chars[(sum + i) % chars.len()] as u32;
                char::from(33 + (c % 94) as u8)
            })
            .collect();

        Ok(Self {
            block_size: chars.len() % 5 + 3,
            chars,
            fingerprint,
        })
    }

    fn value(&self, i: usize) -> u32 {
        self.chars[i % self.chars.len()] as u32
    }

    fn decoy(&self, i: usize) -> char {
        char::from(((self.value(i) as usize + i) % 95 + 32) as u8)
    }

    fn reverse_blocks(&self, text: &mut [char]) {
        text.chunks_mut(self.block_size).for_each(|b| b.reverse());
    }
}

impl MultiCrypt {
    pub fn new() -> Self {
        Self
    }
}

impl KeyWrap for MultiCrypt {
    fn wrap(&self, plaintext: &str, key: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::InvalidInput(
                "the text to wrap can not be empty".to_string(),
            ));
        }
        let kv = KeyValues::new(key)?;

        let mut expanded = Vec::with_capacity((FINGERPRINT_LEN + plaintext.len()) * 2);
        for (i, c) in kv.fingerprint.chars().chain(plaintext.chars()).enumerate() {
            expanded.push(c);
            expanded.push(kv.decoy(i));
        }

        kv.reverse_blocks(&mut expanded);

        let mut xored = String::with_capacity(expanded.len() * 2);
        for (i, c) in expanded.into_iter().enumerate() {
            let v = (c as u32 ^ kv.value(i)) % 0x10000;
            // 落在代理区的值不是合法字符
            let x = char::from_u32(v).ok_or_else(|| {
                CipherError::InvalidInput(format!(
                    "the character `{}` can not be wrapped with this key",
                    c.escape_unicode()
                ))
            })?;
            xored.push(x);
        }

        Ok(codec::encode(&xored))
    }

    fn unwrap(&self, ciphertext: &str, key: &str) -> Result<String, CipherError> {
        if ciphertext.trim().is_empty() {
            return Err(CipherError::InvalidInput(
                "the wrapped text can not be empty".to_string(),
            ));
        }
        let kv = KeyValues::new(key)?;

        let decoded = codec::decode(ciphertext)?;
        let mut unxored = decoded
            .chars()
            .enumerate()
            .map(|(i, c)| {
                char::from_u32((c as u32 ^ kv.value(i)) % 0x10000)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect::<Vec<_>>();

        kv.reverse_blocks(&mut unxored);

        let contracted = unxored.into_iter().step_by(2).collect::<String>();
        if contracted.chars().count() <= FINGERPRINT_LEN {
            return Err(CipherError::Corrupt(
                "the wrapped text is too short".to_string(),
            ));
        }

        match contracted.strip_prefix(kv.fingerprint.as_str()) {
            Some(plain) => Ok(plain.to_string()),
            None => Err(CipherError::WrongPassphrase),
        }
    }
}
