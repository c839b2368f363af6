use crate::error::AppError;

/// One-way password hashing used at account creation and login.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AppError>;
    fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError>;
}

/// bcrypt with a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct Bcrypt {
    cost: u32,
}

impl Bcrypt {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for Bcrypt {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for Bcrypt {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        bcrypt::verify(password, hashed_password)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
    }
}
