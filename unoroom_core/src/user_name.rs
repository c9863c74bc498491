use renet::transport::NETCODE_USER_DATA_BYTES;

const LEN_BYTES: usize = 8;
const MAX_NAME_BYTES: usize = NETCODE_USER_DATA_BYTES - LEN_BYTES;

/// Display name carried in the netcode connect token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Names longer than the token allows are cut on a char boundary.
    pub fn from_string(name: String) -> Self {
        let mut name = name;
        if name.len() > MAX_NAME_BYTES {
            let mut end = MAX_NAME_BYTES;
            while !name.is_char_boundary(end) {
                end -= 1;
            }
            name.truncate(end);
        }
        Username(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_netcode_user_data(&self) -> [u8; NETCODE_USER_DATA_BYTES] {
        let mut user_data = [0u8; NETCODE_USER_DATA_BYTES];
        let bytes = self.0.as_bytes();
        user_data[..LEN_BYTES].copy_from_slice(&(bytes.len() as u64).to_le_bytes());
        user_data[LEN_BYTES..LEN_BYTES + bytes.len()].copy_from_slice(bytes);
        user_data
    }

    pub fn from_user_data(user_data: &[u8; NETCODE_USER_DATA_BYTES]) -> Self {
        let mut len = [0u8; LEN_BYTES];
        len.copy_from_slice(&user_data[..LEN_BYTES]);
        let len = (u64::from_le_bytes(len) as usize).min(MAX_NAME_BYTES);
        let name = String::from_utf8_lossy(&user_data[LEN_BYTES..LEN_BYTES + len]);
        Username(name.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_the_connect_token() {
        let name = Username::from_string("Zoë".to_string());
        let data = name.to_netcode_user_data();
        assert_eq!(Username::from_user_data(&data), name);
    }

    #[test]
    fn long_names_are_truncated_on_a_char_boundary() {
        let name = Username::from_string("é".repeat(200));
        assert!(name.as_str().len() <= MAX_NAME_BYTES);
        assert_eq!(name.as_str().chars().count(), MAX_NAME_BYTES / 2);
    }

    #[test]
    fn bogus_lengths_are_clamped() {
        let mut data = [b'a'; NETCODE_USER_DATA_BYTES];
        data[..LEN_BYTES].copy_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(Username::from_user_data(&data).as_str().len(), MAX_NAME_BYTES);
    }
}
