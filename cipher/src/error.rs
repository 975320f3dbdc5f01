use std::{error::Error, fmt::Display};
use utils::NumError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// 不合法的密钥长度
    InvalidKeySize { min: usize, real: usize },

    InvalidPublicKey(String),

    InvalidPrivateKey(String),

    /// 盐不能为空
    InvalidSalt,

    /// the byte to encrypt is not less than the modulus
    MessageOutOfRange { value: u8 },

    /// 密文不是合法的base64或UTF-8编码
    DecodeError(String),

    /// 解密后的数据不以约定的IV开头
    IvMismatch,

    WrongPassphrase,

    Corrupt(String),

    InvalidInput(String),

    Num(NumError),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeySize { min, real } => f.write_fmt(format_args!(
                "Invalid key size `{real}` bits, need at least `{min}` bits"
            )),
            Self::InvalidPublicKey(s) => f.write_fmt(format_args!("Invalid public key: {s}")),
            Self::InvalidPrivateKey(s) => f.write_fmt(format_args!("Invalid private key: {s}")),
            Self::InvalidSalt => f.write_str("The salt can not be empty"),
            Self::MessageOutOfRange { value } => f.write_fmt(format_args!(
                "The message byte `{value:#04x}` is not less than the key modulus"
            )),
            Self::DecodeError(s) => f.write_fmt(format_args!("Decode failed: {s}")),
            Self::IvMismatch => f.write_str("Invalid IV, wrong key or tampered ciphertext"),
            Self::WrongPassphrase => f.write_str("Wrong passphrase"),
            Self::Corrupt(s) => f.write_fmt(format_args!("Corrupted key data: {s}")),
            Self::InvalidInput(s) => f.write_fmt(format_args!("Invalid input: {s}")),
            Self::Num(e) => e.fmt(f),
        }
    }
}

impl Error for CipherError {}

impl From<NumError> for CipherError {
    fn from(value: NumError) -> Self {
        Self::Num(value)
    }
}
