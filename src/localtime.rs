//! City-local date/time derived from the weather provider's UTC fields.
//!
//! The provider only reports UTC: `dt` (epoch seconds) plus `timezone` (the
//! city's UTC offset in seconds). Local time is just their sum; no timezone
//! database is consulted, so only "now" is modeled, not historical DST.

use chrono::{FixedOffset, TimeZone, Utc};

use crate::weather::WeatherClient;

/// Format an epoch timestamp shifted by a UTC offset as e.g.
/// `"Friday, March 01, 2024 at 01:00 AM"`. Returns `None` for out-of-range
/// values (offsets beyond ±24h, unrepresentable epochs).
pub fn format_local_time(epoch: i64, offset_secs: i32) -> Option<String> {
    let offset = FixedOffset::east_opt(offset_secs)?;
    let utc = Utc.timestamp_opt(epoch, 0).single()?;
    Some(
        utc.with_timezone(&offset)
            .format("%A, %B %d, %Y at %I:%M %p")
            .to_string(),
    )
}

/// Resolve a city's current local date and time. Always returns a sentence:
/// an answer on success, an explanation on failure.
pub async fn resolve(client: &WeatherClient, city: &str) -> String {
    let city = city.trim();
    if city.is_empty() {
        return "Sorry, I couldn't retrieve the time for that location. Please provide a city name."
            .to_string();
    }

    match client.fetch_current_payload(city).await {
        Ok(payload) => match format_local_time(payload.dt, payload.timezone) {
            Some(formatted) => {
                format!("The current date and time in {city} is {formatted}.")
            }
            None => format!(
                "Sorry, I couldn't retrieve the time for {city}. Please check the city name."
            ),
        },
        Err(err) => {
            tracing::warn!(city, error = %err, "time lookup failed");
            format!("An error occurred while fetching time and date for {city}: {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;

    #[test]
    fn epoch_plus_offset_formats_as_local_calendar_time() {
        // 2024-03-01T00:00:00Z with +01:00 offset is 01:00 AM local
        let formatted = format_local_time(1709251200, 3600).unwrap();
        assert_eq!(formatted, "Friday, March 01, 2024 at 01:00 AM");
    }

    #[test]
    fn negative_offset_crosses_midnight_backwards() {
        // 2024-03-01T00:00:00Z at -05:00 is the previous evening
        let formatted = format_local_time(1709251200, -18000).unwrap();
        assert_eq!(formatted, "Thursday, February 29, 2024 at 07:00 PM");
    }

    #[test]
    fn absurd_offset_is_rejected() {
        assert!(format_local_time(1709251200, 999_999).is_none());
    }

    #[tokio::test]
    async fn unreachable_provider_yields_explanatory_string() {
        let client = WeatherClient::new(&WeatherConfig {
            api_key: "test".into(),
            base_url: "http://127.0.0.1:9".into(),
        });
        let answer = resolve(&client, "London").await;
        assert!(answer.starts_with("An error occurred while fetching time and date for London"));
    }

    #[tokio::test]
    async fn blank_city_yields_explanatory_string() {
        let client = WeatherClient::new(&WeatherConfig::default());
        let answer = resolve(&client, "  ").await;
        assert!(answer.contains("provide a city name"));
    }
}
