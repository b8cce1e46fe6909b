//! Credential hashing behind a narrow trait, with a bcrypt implementation.

use crate::domain::PasswordHash;

use super::AppError;

/// Turns raw secrets into stored hashes and checks secrets against them.
pub trait CredentialHasher: Send + Sync + 'static {
    fn hash(&self, raw_password: &str) -> Result<PasswordHash, AppError>;

    fn verify(&self, raw_password: &str, hash: &PasswordHash) -> Result<bool, AppError>;
}

/// bcrypt with a configurable cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// An alias for the library's recommended cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// `cost` increases the rounds of hashing and therefore the time needed to
    /// verify a password. Tests use the minimum of 4.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, raw_password: &str) -> Result<PasswordHash, AppError> {
        bcrypt::hash(raw_password, self.cost)
            .map(PasswordHash::new_unchecked)
            .map_err(|e| AppError::Hashing(e.to_string()))
    }

    fn verify(&self, raw_password: &str, hash: &PasswordHash) -> Result<bool, AppError> {
        bcrypt::verify(raw_password, hash.as_str()).map_err(|e| AppError::Hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_verifiable() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("roostersgocockledoodledoo").unwrap();

        assert!(hasher.verify("roostersgocockledoodledoo", &hash).unwrap());
        assert!(!hasher.verify("the_wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("pw1").unwrap();

        assert!(!hash.as_str().contains("pw1"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = BcryptHasher::new(4);

        assert_ne!(hasher.hash("pw1").unwrap(), hasher.hash("pw1").unwrap());
    }

    #[test]
    fn test_verify_against_known_hash() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );

        assert!(BcryptHasher::default().verify("okon", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hash = PasswordHash::new_unchecked("not-a-bcrypt-hash");

        assert!(matches!(
            BcryptHasher::new(4).verify("pw", &hash),
            Err(AppError::Hashing(_))
        ));
    }
}
