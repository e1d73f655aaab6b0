pub mod cache;
pub mod client;
mod stub;

use std::{sync::Arc, time::Duration};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

pub use cache::ContentCache;
pub use client::{EstimatorClient, OpenAiClient};

use crate::{config::EstimatorConfig, validate::normalize_input};

/// Nutrition estimate for one food description; also the cache entry payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub calories: f64,
    pub gram_carbs: f64,
    pub gram_proteins: f64,
    pub gram_fats: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "whole_rating")]
    pub star_rating: Option<u8>,
}

pub(crate) fn default_quantity() -> f64 {
    1.0
}

/// Ratings arrive as `4` or `4.0`; either is stored as an integer.
pub(crate) fn whole_rating<'de, D>(de: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(v) = Option::<f64>::deserialize(de)? else {
        return Ok(None);
    };
    if v.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&v) {
        return Err(D::Error::custom(format!("star_rating is not a whole number: {v}")));
    }
    Ok(Some(v as u8))
}

impl NutritionEstimate {
    pub fn validate(&self) -> Result<(), EstimateError> {
        let fields = [
            ("calories", self.calories),
            ("gram_carbs", self.gram_carbs),
            ("gram_proteins", self.gram_proteins),
            ("gram_fats", self.gram_fats),
            ("quantity", self.quantity),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(EstimateError::MalformedReply(format!("{name} out of range: {v}")));
            }
        }
        if let Some(r) = self.star_rating {
            if !(1..=5).contains(&r) {
                return Err(EstimateError::MalformedReply(format!("star_rating out of range: {r}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("estimator credential is required but not configured")]
    MissingCredential,

    #[error("estimator request failed: {0}")]
    Transport(String),

    #[error("estimator did not answer within {0}s")]
    Timeout(u64),

    #[error("malformed estimator reply: {0}")]
    MalformedReply(String),

    #[error("could not store estimate: {0}")]
    Cache(String),
}

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap();
}

/// Strip optional markdown fences and decode the estimate JSON.
pub fn parse_reply(content: &str) -> Result<NutritionEstimate, EstimateError> {
    let body = FENCE_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content)
        .trim();
    let estimate: NutritionEstimate = serde_json::from_str(body)
        .map_err(|e| EstimateError::MalformedReply(format!("{e}: {body}")))?;
    estimate.validate()?;
    Ok(estimate)
}

fn system_instruction(locale: &str) -> String {
    format!(
        "You are an expert nutritionist. Analyze the user's input and provide an estimate of \
         calories and macronutrients for the described foods. Also provide a brief nutritional \
         feedback and a star rating of the meal's healthiness (1 - low, 5 - high). Multiply the \
         calories and macronutrients for the quantity defined by the user; the default quantity \
         is 1. Write the feedback using the language {locale}. Respond ONLY with a JSON in the \
         following format: {{\"calories\": number, \"gram_carbs\": number, \"gram_proteins\": \
         number, \"gram_fats\": number, \"feedback\": \"text\", \"quantity\": number, \
         \"star_rating\": number}}."
    )
}

/// Cache first, then the external client, or the stub when no client exists.
pub struct NutritionEstimator {
    cache: ContentCache,
    client: Option<Arc<dyn EstimatorClient>>,
    require_credential: bool,
    feedback_locale: String,
    timeout: Duration,
}

impl NutritionEstimator {
    pub fn new(
        cache: ContentCache,
        client: Option<Arc<dyn EstimatorClient>>,
        cfg: &EstimatorConfig,
    ) -> Self {
        Self {
            cache,
            client,
            require_credential: cfg.require_credential,
            feedback_locale: cfg.feedback_locale.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    pub fn from_config(cache: ContentCache, cfg: &EstimatorConfig) -> anyhow::Result<Self> {
        let client = match &cfg.api_key {
            Some(key) => Some(Arc::new(OpenAiClient::new(cfg, key.clone())?) as Arc<dyn EstimatorClient>),
            None => {
                info!("no estimator key configured; using simulated estimates");
                None
            }
        };
        Ok(Self::new(cache, client, cfg))
    }

    #[instrument(skip(self))]
    pub async fn estimate(&self, input: &str) -> Result<NutritionEstimate, EstimateError> {
        let normalized = normalize_input(input);
        let key = ContentCache::key(&normalized);

        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let estimate = match &self.client {
            None if self.require_credential => return Err(EstimateError::MissingCredential),
            None => stub::simulated_estimate(),
            Some(client) => {
                let system = system_instruction(&self.feedback_locale);
                let content = tokio::time::timeout(self.timeout, client.complete(&system, &normalized))
                    .await
                    .map_err(|_| EstimateError::Timeout(self.timeout.as_secs()))??;
                parse_reply(&content).inspect_err(|e| {
                    warn!(error = %e, "could not parse estimator reply");
                })?
            }
        };

        self.cache
            .put(&key, &estimate)
            .await
            .map_err(|e| EstimateError::Cache(format!("{e:#}")))?;
        Ok(estimate)
    }
}
