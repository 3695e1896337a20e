//! Application state management
//!
//! Shared resources passed to every handler through Axum's state
//! extraction. Built once at startup; every field is cheap to clone.

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::cookies::CookieOptions;
use crate::protection::EdgeProtection;
use crate::repositories::{PgUserRepository, UserRepository};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// User persistence
    pub users: Arc<dyn UserRepository>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Session cookie attributes
    pub cookies: Arc<CookieOptions>,
    /// Shield and bot detection rules
    pub protection: Arc<EdgeProtection>,
}

impl AppState {
    /// Create state backed by PostgreSQL
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self::with_repository(Arc::new(PgUserRepository::new(db)), config)
    }

    /// Create state over any user repository
    pub fn with_repository(users: Arc<dyn UserRepository>, config: AppConfig) -> Self {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.expiry_secs);
        let cookies = CookieOptions::new(&config.cookie, config.secure_cookies());
        let protection = EdgeProtection::new(&config.protection);

        Self {
            users,
            config: Arc::new(config),
            jwt,
            cookies: Arc::new(cookies),
            protection: Arc::new(protection),
        }
    }

    #[inline]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn cookies(&self) -> &CookieOptions {
        &self.cookies
    }

    #[inline]
    pub fn protection(&self) -> &EdgeProtection {
        &self.protection
    }
}
