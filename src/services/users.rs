//! User registration and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new user. Fails if the username is already taken; no
    /// session is opened in that case.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Member);

        self.repository
            .users
            .create(&request.username, &password_hash, role)
            .await
    }

    /// Authenticate a user by username and password
    pub async fn login(&self, request: LoginRequest) -> AppResult<User> {
        let user = self
            .repository
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::BadRequest("Invalid password".to_string()));
        }

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Verify user password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
