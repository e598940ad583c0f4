use async_trait::async_trait;

use super::Tool;
use crate::weather::WeatherClient;

/// Current conditions for a city, as the prose sentence from the weather
/// client. Fetch failures surface as the client's apologetic sentence.
pub struct CurrentWeatherTool {
    client: WeatherClient,
}

impl CurrentWeatherTool {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn name(&self) -> &str {
        "get_current_weather"
    }

    fn description(&self) -> &str {
        "takes a city name as input and returns the current weather details: \
         city name, temperature, feels like, pressure, conditions, visibility, humidity, wind"
    }

    async fn call(&self, input: &str) -> String {
        self.client.fetch_current(input.trim()).await.readable
    }
}
