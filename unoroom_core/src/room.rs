use std::{fmt, str::FromStr};

use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;

pub const ENDPOINT_PREFIX: &str = "UNO-";
const CODE_LEN: usize = 4;

/// Four uppercase alphanumerics naming a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomCode([u8; CODE_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    #[error("room code must be {CODE_LEN} characters, got {0}")]
    Length(usize),
    #[error("room code may only contain letters and digits")]
    Charset,
}

impl RoomCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = [0; CODE_LEN];
        for slot in code.iter_mut() {
            *slot = rng.sample(Alphanumeric).to_ascii_uppercase();
        }
        RoomCode(code)
    }

    pub fn as_str(&self) -> &str {
        // only ever built from ASCII alphanumerics
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Connection endpoint id for this room.
    pub fn endpoint(&self) -> String {
        format!("{ENDPOINT_PREFIX}{self}")
    }

    /// Netcode protocol id derived from the endpoint, so peers holding
    /// different codes never complete a handshake.
    pub fn protocol_id(&self) -> u64 {
        self.endpoint().bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
            (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        })
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = match s.get(..ENDPOINT_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(ENDPOINT_PREFIX) => {
                &s[ENDPOINT_PREFIX.len()..]
            }
            _ => s,
        };
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RoomCodeError::Charset);
        }
        let bytes: [u8; CODE_LEN] = s
            .to_ascii_uppercase()
            .into_bytes()
            .try_into()
            .map_err(|_| RoomCodeError::Length(s.len()))?;
        Ok(RoomCode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn generated_codes_are_uppercase_alphanumerics() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let code = RoomCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), 4);
            assert!(code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn parsing_accepts_lowercase_and_the_prefix() {
        let code: RoomCode = " ab1z ".parse().unwrap();
        assert_eq!(code.to_string(), "AB1Z");
        assert_eq!("uno-AB1Z".parse::<RoomCode>().unwrap(), code);
        assert_eq!(code.endpoint(), "UNO-AB1Z");
    }

    #[test]
    fn parsing_rejects_bad_codes() {
        assert_eq!("ABC".parse::<RoomCode>(), Err(RoomCodeError::Length(3)));
        assert_eq!("AB-C".parse::<RoomCode>(), Err(RoomCodeError::Charset));
        assert_eq!("ABCDE".parse::<RoomCode>(), Err(RoomCodeError::Length(5)));
    }

    #[test]
    fn protocol_ids_differ_per_room() {
        let a: RoomCode = "AAAA".parse().unwrap();
        let b: RoomCode = "AAAB".parse().unwrap();
        assert_ne!(a.protocol_id(), b.protocol_id());
        assert_eq!(a.protocol_id(), "aaaa".parse::<RoomCode>().unwrap().protocol_id());
    }
}
