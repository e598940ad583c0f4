use async_trait::async_trait;

use super::Tool;
use crate::weather::{WeatherClient, WEATHER_UNAVAILABLE};

/// 5-day/3-hour forecast for a city, one line per interval.
pub struct ForecastWeatherTool {
    client: WeatherClient,
}

impl ForecastWeatherTool {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ForecastWeatherTool {
    fn name(&self) -> &str {
        "get_forecast_weather"
    }

    fn description(&self) -> &str {
        "takes a city name as input and returns the weather forecast as lines of \
         datetime, conditions, temperature, wind and humidity"
    }

    async fn call(&self, input: &str) -> String {
        let forecast = self.client.fetch_forecast(input.trim()).await;
        if forecast.is_empty() {
            WEATHER_UNAVAILABLE.to_string()
        } else {
            forecast.readable
        }
    }
}
