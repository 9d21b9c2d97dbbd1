//! One-time codes stored per phone with a TTL.
//!
//! Per phone: `NoCode -> Pending` on [`OtpEngine::store`]; a pending code
//! disappears when its TTL elapses or is replaced by the next `store`. A
//! successful [`OtpEngine::verify`] leaves the code in place unless the engine
//! was built with `single_use`.

use std::sync::Arc;
use std::time::Duration;

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use tably_common::KvStore;
use tracing::debug;

use crate::error::AuthError;
use crate::phone;

pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Generates `length` uniformly random decimal digits from the OS CSPRNG.
pub fn generate_code(length: usize) -> String {
    (0..length)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}

pub struct OtpEngine {
    store: Arc<dyn KvStore>,
    length: usize,
    ttl: Duration,
    single_use: bool,
}

impl OtpEngine {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            length: DEFAULT_CODE_LENGTH,
            ttl: DEFAULT_TTL,
            single_use: false,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Delete the code once it has been verified.
    pub fn with_single_use(mut self, single_use: bool) -> Self {
        self.single_use = single_use;
        self
    }

    pub fn code_length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> String {
        generate_code(self.length)
    }

    /// Stores `code` for `phone` with the engine's TTL, replacing any pending code.
    pub async fn store(&self, phone: &str, code: &str) -> Result<(), AuthError> {
        self.store_with_ttl(phone, code, self.ttl).await
    }

    pub async fn store_with_ttl(
        &self,
        phone: &str,
        code: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        self.store
            .put(phone, code.to_string(), Some(ttl))
            .await?;
        debug!(phone = %phone::mask(phone), ttl_secs = ttl.as_secs(), "stored code");
        Ok(())
    }

    /// Succeeds only if `code` equals the pending code for `phone`.
    pub async fn verify(&self, phone: &str, code: &str) -> Result<(), AuthError> {
        let stored = self.store.get(phone).await?;
        match stored {
            Some(expected) if constant_time_eq(expected.as_bytes(), code.as_bytes()) => {
                if self.single_use {
                    self.store.delete(phone).await?;
                }
                Ok(())
            }
            Some(_) => {
                debug!(phone = %phone::mask(phone), "code mismatch");
                Err(AuthError::InvalidOrExpiredCode)
            }
            None => {
                debug!(phone = %phone::mask(phone), "no pending code");
                Err(AuthError::InvalidOrExpiredCode)
            }
        }
    }

    /// Drops any pending code for `phone`.
    pub async fn discard(&self, phone: &str) -> Result<(), AuthError> {
        self.store.delete(phone).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tably_common::MemoryKvStore;

    const PHONE: &str = "+14155551234";

    fn engine() -> OtpEngine {
        OtpEngine::new(Arc::new(MemoryKvStore::new("otp")))
    }

    #[test]
    fn test_generate_code_shape() {
        for length in [4, 6, 8] {
            let code = generate_code(length);
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_code_uses_all_digits() {
        let mut seen = [false; 10];
        for _ in 0..200 {
            for c in generate_code(6).chars() {
                seen[c.to_digit(10).unwrap() as usize] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[tokio::test]
    async fn test_verify_matches_stored_code() {
        let engine = engine();
        engine.store(PHONE, "123456").await.unwrap();

        assert!(engine.verify(PHONE, "123456").await.is_ok());
        assert!(matches!(
            engine.verify(PHONE, "000000").await,
            Err(AuthError::InvalidOrExpiredCode)
        ));
    }

    #[tokio::test]
    async fn test_verify_without_code_fails() {
        let engine = engine();
        assert!(matches!(
            engine.verify(PHONE, "123456").await,
            Err(AuthError::InvalidOrExpiredCode)
        ));
    }

    #[tokio::test]
    async fn test_new_code_replaces_previous() {
        let engine = engine();
        engine.store(PHONE, "111111").await.unwrap();
        engine.store(PHONE, "222222").await.unwrap();

        assert!(engine.verify(PHONE, "111111").await.is_err());
        assert!(engine.verify(PHONE, "222222").await.is_ok());
    }

    #[tokio::test]
    async fn test_code_reusable_within_ttl_by_default() {
        let engine = engine();
        engine.store(PHONE, "123456").await.unwrap();

        assert!(engine.verify(PHONE, "123456").await.is_ok());
        assert!(engine.verify(PHONE, "123456").await.is_ok());
    }

    #[tokio::test]
    async fn test_single_use_deletes_after_success() {
        let engine = engine().with_single_use(true);
        engine.store(PHONE, "123456").await.unwrap();

        assert!(engine.verify(PHONE, "000000").await.is_err());
        assert!(engine.verify(PHONE, "123456").await.is_ok());
        assert!(engine.verify(PHONE, "123456").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_expires_after_ttl() {
        let engine = engine().with_ttl(Duration::from_secs(300));
        engine.store(PHONE, "123456").await.unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(matches!(
            engine.verify(PHONE, "123456").await,
            Err(AuthError::InvalidOrExpiredCode)
        ));
    }

    #[tokio::test]
    async fn test_discard_removes_code() {
        let engine = engine();
        engine.store(PHONE, "123456").await.unwrap();
        engine.discard(PHONE).await.unwrap();
        assert!(engine.verify(PHONE, "123456").await.is_err());
    }
}
