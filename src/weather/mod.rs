//! OpenWeatherMap client and report formatting.
//!
//! [`WeatherClient`] fetches current conditions and the 5-day/3-hour forecast.
//! Network and provider failures are downgraded to sentinel strings or empty
//! interval lists; callers treat them as "no data", never as crash paths.
//! Payload parsing and formatting live in [`report`] so they can be tested
//! from JSON fixtures without a network.

pub mod client;
pub mod report;

pub use client::WeatherClient;
pub use report::{CurrentWeather, Forecast, ForecastInterval};

/// Sentinel placed in `CurrentWeather::report` when the provider call fails.
pub const CURRENT_WEATHER_ERROR: &str = "error getting current weather";

/// Apologetic sentence used wherever weather data could not be retrieved.
pub const WEATHER_UNAVAILABLE: &str =
    "Sorry, I couldn't retrieve the weather data at this time. Please try again later.";
