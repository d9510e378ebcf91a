use rand::RngExt;

use crate::domain::repository::KeyGenerator;
use crate::domain::types::{LICENSE_KEY_GROUP_LEN, LICENSE_KEY_GROUPS};

/// Charset for license keys (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Thread-local RNG backed `XXXX-XXXX-XXXX-XXXX` generator.
#[derive(Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..LICENSE_KEY_GROUPS)
            .map(|_| {
                (0..LICENSE_KEY_GROUP_LEN)
                    .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("-")
    }
}
