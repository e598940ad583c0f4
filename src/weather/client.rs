//! HTTP transport for the weather provider.

use anyhow::{Context, Result};
use reqwest::Client;

use super::report::{CurrentPayload, CurrentWeather, Forecast, ForecastPayload};
use crate::config::WeatherConfig;

/// Stateless client for the weather provider. All public fetchers downgrade
/// failures to "no data" values; only the payload-level helpers return errors,
/// for callers (like the time resolver) that need to explain what went wrong.
#[derive(Clone)]
pub struct WeatherClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current conditions. Never fails: transport errors, non-2xx
    /// statuses, and blank city names all come back as the sentinel value.
    pub async fn fetch_current(&self, city: &str) -> CurrentWeather {
        if city.trim().is_empty() {
            return CurrentWeather::error();
        }
        match self.fetch_current_payload(city).await {
            Ok(payload) => CurrentWeather::from_payload(&payload),
            Err(err) => {
                tracing::warn!(city, error = %err, "current weather fetch failed");
                CurrentWeather::error()
            }
        }
    }

    /// Fetch the 5-day/3-hour forecast. Failures yield an empty forecast.
    pub async fn fetch_forecast(&self, city: &str) -> Forecast {
        if city.trim().is_empty() {
            return Forecast::default();
        }
        match self.fetch_forecast_payload(city).await {
            Ok(payload) => Forecast::from_payload(&payload),
            Err(err) => {
                tracing::warn!(city, error = %err, "forecast fetch failed");
                Forecast::default()
            }
        }
    }

    /// Raw current-conditions payload. Used by [`fetch_current`] and by the
    /// time resolver, which reads `dt` and `timezone` directly.
    ///
    /// [`fetch_current`]: Self::fetch_current
    pub async fn fetch_current_payload(&self, city: &str) -> Result<CurrentPayload> {
        let url = format!("{}/weather", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("appid", self.api_key.as_str()), ("q", city), ("units", "metric")])
            .send()
            .await
            .context("weather request failed")?
            .error_for_status()
            .context("weather provider returned an error status")?;

        response
            .json::<CurrentPayload>()
            .await
            .context("failed to decode weather payload")
    }

    async fn fetch_forecast_payload(&self, city: &str) -> Result<ForecastPayload> {
        let url = format!("{}/forecast", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("appid", self.api_key.as_str()), ("q", city), ("units", "metric")])
            .send()
            .await
            .context("forecast request failed")?
            .error_for_status()
            .context("weather provider returned an error status")?;

        response
            .json::<ForecastPayload>()
            .await
            .context("failed to decode forecast payload")
    }
}
