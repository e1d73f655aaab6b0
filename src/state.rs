use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::estimator::{ContentCache, NutritionEstimator};
use crate::records::{DayStore, MonthAggregator, RecordService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: Arc<RecordService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .with_context(|| format!("create data dir {}", config.data_dir.display()))?;
        tracing::info!(
            data_dir = %config.data_dir.display(),
            stub_estimates = config.estimator.api_key.is_none(),
            "configuration loaded"
        );

        let cache = ContentCache::new(config.data_dir.join("cache-llm"));
        let estimator = NutritionEstimator::from_config(cache, &config.estimator)?;
        Ok(Self::from_parts(Arc::new(config), Arc::new(estimator)))
    }

    pub fn from_parts(config: Arc<AppConfig>, estimator: Arc<NutritionEstimator>) -> Self {
        let records = RecordService::new(
            DayStore::new(&config.data_dir),
            MonthAggregator::new(&config.data_dir),
            estimator,
        );
        Self {
            config,
            records: Arc::new(records),
        }
    }

    /// Stub-mode state rooted at `data_dir`, access code `123456`.
    #[cfg(test)]
    pub fn fake(data_dir: &std::path::Path) -> Self {
        use crate::config::{digest_secret, AuthConfig, DailyTargets, DEFAULT_AUTH_CODE};

        let config = Arc::new(AppConfig {
            data_dir: data_dir.to_path_buf(),
            auth: AuthConfig {
                secret_digest: digest_secret(DEFAULT_AUTH_CODE),
                cookie_name: "foodtracker_auth".into(),
                cookie_lifetime_secs: 3600,
            },
            estimator: crate::estimator::tests::test_config(),
            targets: DailyTargets {
                daily_calories_target: 2000.0,
                daily_carbs_target: 250.0,
                daily_proteins_target: 90.0,
                daily_fats_target: 70.0,
            },
        });
        let cache = ContentCache::new(data_dir.join("cache-llm"));
        let estimator = NutritionEstimator::new(cache, None, &config.estimator);
        Self::from_parts(config, Arc::new(estimator))
    }
}
