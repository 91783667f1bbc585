//! Gold price oracle
//!
//! Fetches the external gold price, caches it for a short window, and
//! derives the pegged token prices. Display paths must never hard-fail on
//! feed trouble, so a fetch error falls back to fixed mock data instead of
//! propagating.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::model::{GoldPriceSample, PriceSource, Token, TokenPriceQuote, GRAMS_PER_TROY_OUNCE};

/// Mock gold price used when the feed is unreachable, USD per troy ounce
pub const MOCK_GOLD_PRICE_PER_OUNCE: Decimal = Decimal::from_parts(205000, 0, 0, false, 2);

/// Clock abstraction so tests can control cache staleness
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used in production
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of the external USD-per-ounce gold price
#[async_trait]
pub trait GoldPriceFeed: Send + Sync {
    async fn fetch_price_per_ounce(&self) -> anyhow::Result<Decimal>;
}

/// Per-asset price entry in the CoinGecko simple price payload
#[derive(Debug, Deserialize)]
struct AssetPrice {
    usd: f64,
}

/// CoinGecko simple-price feed (PAX Gold tracks the gold spot price)
pub struct CoinGeckoFeed {
    client: reqwest::Client,
    api_url: String,
    asset_id: String,
}

impl CoinGeckoFeed {
    /// Create a feed client with a bounded per-request timeout.
    /// A failed fetch is never retried within the same call.
    pub fn new(api_url: String, asset_id: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_url,
            asset_id,
        }
    }
}

#[async_trait]
impl GoldPriceFeed for CoinGeckoFeed {
    async fn fetch_price_per_ounce(&self) -> anyhow::Result<Decimal> {
        let response = self.client.get(&self.api_url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("gold feed responded with status {}", response.status());
        }

        let payload: HashMap<String, AssetPrice> = response.json().await?;

        let usd = payload
            .get(&self.asset_id)
            .map(|asset| asset.usd)
            .ok_or_else(|| anyhow::anyhow!("asset '{}' missing from feed payload", self.asset_id))?;

        Decimal::from_f64(usd)
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(|| anyhow::anyhow!("feed returned unusable price: {}", usd))
    }
}

/// Gold price oracle with an owned in-process cache
///
/// The cache is last-write-wins: under contention concurrent callers may
/// each trigger a refresh, which costs a few redundant fetches but never a
/// wrong result.
pub struct PriceOracle {
    feed: Arc<dyn GoldPriceFeed>,
    clock: Arc<dyn Clock>,
    cache_duration: Duration,
    cached: RwLock<Option<GoldPriceSample>>,
}

impl PriceOracle {
    /// Create a new oracle instance
    pub fn new(feed: Arc<dyn GoldPriceFeed>, clock: Arc<dyn Clock>, cache_duration: Duration) -> Self {
        Self {
            feed,
            clock,
            cache_duration,
            cached: RwLock::new(None),
        }
    }

    /// Get the current gold price, from cache when fresh enough.
    ///
    /// Never returns an error: a failed fetch is logged and replaced with
    /// the fixed mock sample, which is cached like a live one so a dead
    /// feed is retried at most once per cache window.
    pub async fn get_gold_price(&self) -> GoldPriceSample {
        let now = self.clock.now();

        if let Some(sample) = self.cached.read().await.as_ref() {
            let age = now.signed_duration_since(sample.fetched_at);
            if age.num_seconds() >= 0 && (age.num_seconds() as u64) < self.cache_duration.as_secs()
            {
                return sample.clone();
            }
        }

        let sample = match self.feed.fetch_price_per_ounce().await {
            Ok(price_per_ounce) => {
                tracing::info!(price_per_ounce = %price_per_ounce, "Gold price fetched from feed");
                Self::sample_from_ounce_price(price_per_ounce, now, PriceSource::Live)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Gold price feed failed, using mock data");
                Self::sample_from_ounce_price(MOCK_GOLD_PRICE_PER_OUNCE, now, PriceSource::Fallback)
            }
        };

        *self.cached.write().await = Some(sample.clone());

        sample
    }

    /// Derive the pegged price for a token from the current gold sample
    pub async fn get_token_price(&self, token: Token) -> TokenPriceQuote {
        let sample = self.get_gold_price().await;
        Self::quote_from_sample(&sample, token)
    }

    /// Invalidate the cache and fetch a fresh sample immediately
    pub async fn force_refresh(&self) -> GoldPriceSample {
        *self.cached.write().await = None;
        self.get_gold_price().await
    }

    /// Pure derivation of a token quote from a gold sample
    pub fn quote_from_sample(sample: &GoldPriceSample, token: Token) -> TokenPriceQuote {
        let unit_price_usd = (sample.price_per_gram * token.gold_weight_grams())
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        TokenPriceQuote {
            token,
            unit_price_usd,
            gold_price_per_gram: sample.price_per_gram,
            gold_weight_grams: token.gold_weight_grams(),
            as_of: sample.fetched_at,
            source: sample.source,
        }
    }

    fn sample_from_ounce_price(
        price_per_ounce: Decimal,
        fetched_at: DateTime<Utc>,
        source: PriceSource,
    ) -> GoldPriceSample {
        let price_per_gram = (price_per_ounce / GRAMS_PER_TROY_OUNCE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        GoldPriceSample {
            price_per_gram,
            price_per_ounce: price_per_ounce
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            fetched_at,
            source,
        }
    }
}
