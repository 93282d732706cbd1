use std::env;

use anyhow::Context;

use crate::domain::entities::DeductionPolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// HMAC secret used to sign bearer tokens (HS256)
    pub jwt_secret: String,
    /// Bearer token lifetime
    pub jwt_expiry_hours: i64,
    /// Absence deduction policy used when a request does not pick one
    pub deduction_policy: DeductionPolicy,
    pub port: u16,
    /// Sustained login/register requests per second per peer IP
    pub login_rate_per_second: u64,
    pub login_rate_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let deduction_policy = match env::var("SALARY_DEDUCTION_POLICY") {
            Ok(value) => value
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("SALARY_DEDUCTION_POLICY is invalid")?,
            Err(_) => DeductionPolicy::default(),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-not-for-production".to_string()),
            jwt_expiry_hours: parse_or("JWT_EXPIRY_HOURS", 8),
            deduction_policy,
            port: parse_or("PORT", 8080),
            login_rate_per_second: parse_or("LOGIN_RATE_PER_SECOND", 2),
            login_rate_burst: parse_or("LOGIN_RATE_BURST", 5),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
