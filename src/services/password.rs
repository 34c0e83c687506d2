/*
 * Responsibility
 * - パスワードのハッシュ化と照合 (bcrypt, "$2b$<cost>$<salt+hash>")
 * - cost の範囲 (10-14) は config で検証済み。ここでは bcrypt が受け付ける値をそのまま使う
 * - CPU を食うので呼び出し側は spawn_blocking で実行する
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// `false` for a mismatch and for a stored value that is not a bcrypt hash.
pub fn verify_password(stored: &str, password: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's lowest cost; keeps the suite fast
    const TEST_COST: u32 = 4;

    #[test]
    fn hashed_password_verifies() {
        let stored = hash_password("Secret#123", TEST_COST).unwrap();
        assert!(stored.starts_with("$2b$04$"));
        assert!(verify_password(&stored, "Secret#123"));
        assert!(!verify_password(&stored, "secret#123"));
        assert!(!verify_password(&stored, ""));
    }

    #[test]
    fn cost_is_written_into_the_hash() {
        let stored = hash_password("pw", 10).unwrap();
        let parts: Vec<&str> = stored.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1], "2b");
        assert_eq!(parts[2], "10");
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(
            hash_password("pw", TEST_COST).unwrap(),
            hash_password("pw", TEST_COST).unwrap()
        );
    }

    #[test]
    fn cost_outside_bcrypt_range_is_an_error() {
        assert!(matches!(hash_password("pw", 3), Err(PasswordError::Hash(_))));
        assert!(matches!(hash_password("pw", 32), Err(PasswordError::Hash(_))));
    }

    #[test]
    fn unknown_formats_never_verify() {
        for stored in ["", "pw", "md5$abc$def", "sha256$a$b", "$2b$04$short"] {
            assert!(!verify_password(stored, "pw"), "{stored:?}");
        }
    }
}
