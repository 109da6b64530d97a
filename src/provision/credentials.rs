// Secrets minted when a record is first created

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const DAEMON_TOKEN_ID_LEN: usize = 16;
pub const DAEMON_TOKEN_LEN: usize = 64;

/// Hash a cleartext password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Random `[A-Za-z0-9]` string from the thread-local CSPRNG
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A node's `(token_id, token)` pair
pub fn daemon_credentials() -> (String, String) {
    (random_string(DAEMON_TOKEN_ID_LEN), random_string(DAEMON_TOKEN_LEN))
}
