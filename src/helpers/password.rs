use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::Argon2;
use rand::RngCore;

/// Password hashing seam. Implementations return self-describing hash
/// strings and compare a candidate against one.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, String>;

    fn verify(&self, hash: &str, password: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|err| err.to_string())?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| {
                tracing::error!("error hashing password {err:?}");
                err.to_string()
            })
    }

    fn verify(&self, hash: &str, password: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(err) => {
                tracing::warn!("stored password hash is malformed {err:?}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_original_password() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("pw").unwrap();
        assert_ne!(hash, "pw");
        assert!(hasher.verify(&hash, "pw"));
        assert!(!hasher.verify(&hash, "wrong"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = Argon2Hasher;
        assert_ne!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!Argon2Hasher.verify("not-a-phc-string", "pw"));
    }
}
