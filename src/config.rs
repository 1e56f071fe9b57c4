use crate::payroll::split::SplitPolicy;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Payroll policy: the statutory ceiling on declared daily pay. These are
    // business-configured amounts that change with minimum-wage adjustments,
    // so they come from the environment rather than code.
    pub official_daily_cap: f64,
    pub official_base_days: i32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            official_daily_cap: env::var("OFFICIAL_DAILY_CAP")
                .unwrap_or_else(|_| "28075".to_string())
                .parse()
                .unwrap(),
            official_base_days: env::var("OFFICIAL_BASE_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
        }
    }

    pub fn split_policy(&self) -> SplitPolicy {
        SplitPolicy {
            official_daily_cap: self.official_daily_cap,
            official_base_days: self.official_base_days,
        }
    }
}
