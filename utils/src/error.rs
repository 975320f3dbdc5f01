use std::{error::Error, fmt::Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumError {
    /// gcd(a, modulus) != 1
    NoModularInverse,

    /// 在给定的尝试次数内没有找到满足条件的数
    GenerationTimeout { attempts: usize },

    /// 不合法的位长度
    InvalidBits(usize),
}

impl Display for NumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoModularInverse => f.write_str("no modular inverse exists, the operands are not coprime"),
            Self::GenerationTimeout { attempts } => f.write_fmt(format_args!(
                "no suitable number found after `{attempts}` attempts"
            )),
            Self::InvalidBits(bits) => {
                f.write_fmt(format_args!("invalid bits length `{bits}`, need at least 2-bits"))
            }
        }
    }
}

impl Error for NumError {}
