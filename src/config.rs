use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Shared-secret session settings. Only the digest of the secret is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lowercase hex SHA-256 of the access code; also the session cookie value.
    pub secret_digest: String,
    pub cookie_name: String,
    pub cookie_lifetime_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    /// `None` puts the estimator in stub mode.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Fail instead of stubbing when no key is configured.
    pub require_credential: bool,
    /// Language the feedback text should be written in, e.g. `EN`.
    pub feedback_locale: String,
}

/// Daily nutrition targets exposed through `get-config`. Zero means unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyTargets {
    pub daily_calories_target: f64,
    pub daily_carbs_target: f64,
    pub daily_proteins_target: f64,
    pub daily_fats_target: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub auth: AuthConfig,
    pub estimator: EstimatorConfig,
    pub targets: DailyTargets,
}

pub const DEFAULT_AUTH_CODE: &str = "123456";

pub fn digest_secret(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let secret_digest = match std::env::var("AUTH_CODE_SHA256") {
            Ok(d) => {
                let d = d.trim().to_lowercase();
                anyhow::ensure!(
                    d.len() == 64 && d.chars().all(|c| c.is_ascii_hexdigit()),
                    "AUTH_CODE_SHA256 must be a 64 character hex digest"
                );
                d
            }
            Err(_) => {
                let code = std::env::var("AUTH_CODE").unwrap_or_else(|_| DEFAULT_AUTH_CODE.into());
                digest_secret(&code)
            }
        };

        let auth = AuthConfig {
            secret_digest,
            cookie_name: std::env::var("COOKIE_NAME").unwrap_or_else(|_| "foodtracker_auth".into()),
            cookie_lifetime_secs: parse_or("COOKIE_LIFETIME_SECS", 60 * 60 * 24 * 30),
        };

        let estimator = EstimatorConfig {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty() && k != "your-api-key-here"),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            timeout_secs: parse_or("ESTIMATOR_TIMEOUT_SECS", 30),
            require_credential: parse_or("ESTIMATOR_REQUIRE_CREDENTIAL", false),
            feedback_locale: std::env::var("FEEDBACK_LOCALE").unwrap_or_else(|_| "EN".into()),
        };

        let targets = DailyTargets {
            daily_calories_target: parse_or("DAILY_CALORIES_TARGET", 0.0),
            daily_carbs_target: parse_or("DAILY_CARBS_TARGET", 0.0),
            daily_proteins_target: parse_or("DAILY_PROTEINS_TARGET", 0.0),
            daily_fats_target: parse_or("DAILY_FATS_TARGET", 0.0),
        };

        Ok(Self {
            data_dir,
            auth,
            estimator,
            targets,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
