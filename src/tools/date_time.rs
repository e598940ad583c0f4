use async_trait::async_trait;

use super::Tool;
use crate::localtime;
use crate::weather::WeatherClient;

/// Current local date and time for a city, derived from the weather
/// provider's UTC timestamp and offset.
pub struct DateTimeTool {
    client: WeatherClient,
}

impl DateTimeTool {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for DateTimeTool {
    fn name(&self) -> &str {
        "get_current_date_time"
    }

    fn description(&self) -> &str {
        "takes a city name as input and returns the current local date and time. \
         Add days to the result yourself for relative dates like tomorrow"
    }

    async fn call(&self, input: &str) -> String {
        localtime::resolve(&self.client, input).await
    }
}
