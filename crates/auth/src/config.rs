use std::time::Duration;

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// Page the gate redirects to, and the only admin page it lets through.
    pub login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_password: None,
            jwt_secret: None,
            token_ttl: Duration::from_secs(24 * 60 * 60),
            cookie_name: "admin_token".to_string(),
            cookie_secure: false,
            login_path: "/admin/login".to_string(),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ADMIN_EMAIL`: Admin login email (login fails with 500 when unset)
    /// - `ADMIN_PASSWORD`: Admin login password (login fails with 500 when unset)
    /// - `JWT_SECRET`: HS256 signing secret for the admin token (login fails with 500 when unset)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: false)
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
            jwt_secret: non_empty("JWT_SECRET"),
            cookie_secure,
            ..Self::default()
        }
    }

    /// A fully configured admin account, for tests and local runs.
    pub fn with_credentials(
        email: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            admin_email: Some(email.into()),
            admin_password: Some(password.into()),
            jwt_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Whether every secret needed to log in is present.
    pub fn is_configured(&self) -> bool {
        self.admin_email.is_some() && self.admin_password.is_some() && self.jwt_secret.is_some()
    }
}
