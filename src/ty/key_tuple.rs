use std::fmt::{Display, Formatter};
use std::str::FromStr;

use cipher::rsa::{PrivateKey, PublicKey};
use num_bigint::BigUint;
use serde::de::Error as DeError;
use serde::ser::{Error as SerError, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::error::AcryptError;

/// `(exponent, modulus)` of a public or private key.
///
/// In JSON it is a two elements array of plain integers of any size, e.g. `[65537, 1000036000099]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyTuple {
    pub exponent: BigUint,
    pub modulus: BigUint,
}

impl KeyTuple {
    pub fn new(exponent: BigUint, modulus: BigUint) -> Self {
        Self { exponent, modulus }
    }

    pub fn into_public_key(self) -> PublicKey {
        PublicKey::new_uncheck(self.exponent, self.modulus)
    }

    pub fn into_private_key(self) -> PrivateKey {
        PrivateKey::new_uncheck(self.exponent, self.modulus)
    }

    pub fn to_json(&self) -> Result<String, AcryptError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, AcryptError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl From<&PublicKey> for KeyTuple {
    fn from(value: &PublicKey) -> Self {
        Self::new(value.exponent().clone(), value.modulus().clone())
    }
}

impl From<&PrivateKey> for KeyTuple {
    fn from(value: &PrivateKey) -> Self {
        Self::new(value.exponent().clone(), value.modulus().clone())
    }
}

impl Serialize for KeyTuple {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        for x in [&self.exponent, &self.modulus] {
            let num = Number::from_str(&x.to_string()).map_err(S::Error::custom)?;
            tuple.serialize_element(&num)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for KeyTuple {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [e, n] = <[Number; 2]>::deserialize(deserializer)?;
        let parse = |x: Number| {
            BigUint::from_str(&x.to_string())
                .map_err(|_| D::Error::custom(format!("`{x}` is not an unsigned integer")))
        };

        Ok(Self::new(parse(e)?, parse(n)?))
    }
}

/// accept `e,n`, `(e, n)` and `[e, n]`
impl FromStr for KeyTuple {
    type Err = AcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let inner = s
            .strip_prefix('(')
            .and_then(|x| x.strip_suffix(')'))
            .or_else(|| s.strip_prefix('[').and_then(|x| x.strip_suffix(']')))
            .unwrap_or(s);

        let parts = inner.split(',').map(str::trim).collect::<Vec<_>>();
        let [e, n] = parts.as_slice() else {
            return Err(AcryptError::InvalidInput(format!(
                "the key `{s}` should be two integers like `e,n`"
            )));
        };

        let parse = |x: &str| {
            BigUint::from_str(x).map_err(|err| {
                AcryptError::InvalidInput(format!("`{x}` is not an unsigned integer: {err}"))
            })
        };

        Ok(Self::new(parse(*e)?, parse(*n)?))
    }
}

impl Display for KeyTuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.exponent, self.modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIG: &str = "179769313486231590772930519078902473361797697894230657273430081157732675805500963132708477322407536021120113879871393357658789768814416622492847430639474124377767893424865485276302219601246094119453082952085005768838150682342462881473913110540827237163350510684586298239947245938479716304835356329624224137859";

    #[test]
    fn json_plain_integers() {
        let kt = KeyTuple::new(BigUint::from(65537u32), BigUint::from_str(BIG).unwrap());
        let json = kt.to_json().unwrap();
        assert_eq!(json, format!("[65537,{BIG}]"));
        assert_eq!(KeyTuple::from_json(&json).unwrap(), kt);
    }

    #[test]
    fn json_with_spaces() {
        let kt = KeyTuple::from_json("[983264276609, 1000036000099]").unwrap();
        assert_eq!(kt.exponent, BigUint::from(983264276609u64));
        assert_eq!(kt.modulus, BigUint::from(1000036000099u64));
    }

    #[test]
    fn json_rejects() {
        for bad in ["[1]", "[1, 2, 3]", "[-1, 5]", "[1.5, 7]", "[\"1\", \"2\"]", "{}"] {
            assert!(KeyTuple::from_json(bad).is_err(), "`{bad}` accepted");
        }
    }

    #[test]
    fn parse_user_input() {
        let expect = KeyTuple::new(BigUint::from(123u32), BigUint::from(456u32));
        for s in ["123,456", "(123, 456)", " [123 ,456] ", "123, 456"] {
            assert_eq!(s.parse::<KeyTuple>().unwrap(), expect, "`{s}`");
        }

        for bad in ["", "123", "1,2,3", "(a, b)", "(123, -456)", "(123 456)"] {
            assert!(
                matches!(bad.parse::<KeyTuple>(), Err(AcryptError::InvalidInput(_))),
                "`{bad}` accepted"
            );
        }
    }

    #[test]
    fn keys_conversion() {
        let pk = PublicKey::new_uncheck(BigUint::from(65537u32), BigUint::from(1000036000099u64));
        let kt = KeyTuple::from(&pk);
        assert_eq!(kt.to_string(), pk.to_string());
        assert_eq!(kt.into_public_key(), pk);
    }
}
