//! Redis-backed session store
//!
//! Sessions are opaque tokens mapped to user ids with a TTL. Handlers never
//! touch ambient session state; they resolve a token to a user id through
//! this service.

use rand::RngCore;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct SessionService {
    client: Client,
    ttl_seconds: u64,
}

impl SessionService {
    /// Create a new session service and verify the Redis connection
    pub async fn new(url: &str, ttl_hours: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            ttl_seconds: ttl_hours * 3600,
        })
    }

    /// Open a session for a user and return the opaque token
    pub async fn create(&self, user_id: i32) -> AppResult<String> {
        let token = generate_token();

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("session:{}", token);
        conn.set_ex::<_, _, ()>(&key, user_id, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store session in Redis: {}", e)))?;

        Ok(token)
    }

    /// Resolve a session token to a user id, if the session is still live
    pub async fn resolve(&self, token: &str) -> AppResult<Option<i32>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("session:{}", token);
        let user_id: Option<i32> = conn
            .get(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))?;

        Ok(user_id)
    }

    /// Invalidate a session token
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("session:{}", token);
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete session from Redis: {}", e)))?;

        Ok(())
    }
}

/// 32 random bytes, hex-encoded
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
