//! Provider payload types and the textual report formatters.

use chrono::{FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Current-conditions payload from the provider (`/weather`).
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub main: MainReadings,
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub visibility: i64,
    pub wind: Wind,
    /// UTC epoch seconds of the observation.
    pub dt: i64,
    /// UTC offset of the city, in seconds (signed).
    pub timezone: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

/// Forecast payload from the provider (`/forecast`): 40 entries at 3-hour
/// granularity plus city metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    pub city: ForecastCity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: ForecastReadings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    /// UTC offset of the city, in seconds (signed).
    pub timezone: i32,
}

/// Current weather in two textual shapes: a labeled multi-line report for the
/// UI and a prose sentence for the agent.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeather {
    pub report: String,
    pub readable: String,
}

impl CurrentWeather {
    /// True when `report` carries the fetch-failure sentinel.
    pub fn is_error(&self) -> bool {
        self.report == super::CURRENT_WEATHER_ERROR
    }
}

/// One forecast interval, timestamped in the city's local time.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastInterval {
    pub datetime: String,
    pub temp: f64,
    pub description: String,
    pub wind: f64,
    pub humidity: f64,
}

/// Parsed forecast: chronological intervals plus a line-per-interval summary.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Forecast {
    pub intervals: Vec<ForecastInterval>,
    pub readable: String,
}

impl Forecast {
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Uppercase the first character of a provider description ("light rain" →
/// "Light rain").
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Format an epoch timestamp in the city's local time as e.g.
/// `"Fri 01 Mar 01:00 AM"`. Returns `None` for out-of-range values.
pub fn format_interval_time(epoch: i64, offset_secs: i32) -> Option<String> {
    let offset = FixedOffset::east_opt(offset_secs)?;
    let utc = Utc.timestamp_opt(epoch, 0).single()?;
    Some(utc.with_timezone(&offset).format("%a %d %b %I:%M %p").to_string())
}

impl CurrentWeather {
    /// Build both textual shapes from a provider payload.
    pub fn from_payload(payload: &CurrentPayload) -> Self {
        let description = payload
            .weather
            .first()
            .map(|c| capitalize(&c.description))
            .unwrap_or_default();

        let report = format!(
            "📍 CITY: {name}\n\
             🌡️ TEMPERATURE: {temp}°C\n\
             🤗 FEELS LIKE: {feels_like}°C\n\
             📈 PRESSURE: {pressure} hPa\n\
             🌥️ CONDITIONS: {description}\n\
             👁️ VISIBILITY: {visibility} m\n\
             💧 HUMIDITY: {humidity}%\n\
             💨 WIND: {wind} m/s",
            name = payload.name,
            temp = payload.main.temp,
            feels_like = payload.main.feels_like,
            pressure = payload.main.pressure,
            description = description,
            visibility = payload.visibility,
            humidity = payload.main.humidity,
            wind = payload.wind.speed,
        );

        let readable = format!(
            "The current weather in {name} is {description}, with a temperature of {temp}°C, \
             feeling like {feels_like}°C. Humidity is at {humidity}%, and the air pressure is \
             {pressure} hPa. Visibility is around {visibility_km} km, and winds are blowing at \
             {wind} m/s.",
            name = payload.name,
            description = description,
            temp = payload.main.temp,
            feels_like = payload.main.feels_like,
            humidity = payload.main.humidity,
            pressure = payload.main.pressure,
            visibility_km = payload.visibility / 1000,
            wind = payload.wind.speed,
        );

        Self { report, readable }
    }

    /// The "no data" value returned on any fetch failure.
    pub fn error() -> Self {
        Self {
            report: super::CURRENT_WEATHER_ERROR.into(),
            readable: super::WEATHER_UNAVAILABLE.into(),
        }
    }
}

impl Forecast {
    /// Parse the provider payload into chronological intervals, timestamped in
    /// the city's own UTC offset.
    pub fn from_payload(payload: &ForecastPayload) -> Self {
        let mut intervals = Vec::with_capacity(payload.list.len());
        let mut lines = Vec::with_capacity(payload.list.len());

        for entry in &payload.list {
            let Some(datetime) = format_interval_time(entry.dt, payload.city.timezone) else {
                continue;
            };
            let description = entry
                .weather
                .first()
                .map(|c| capitalize(&c.description))
                .unwrap_or_default();

            lines.push(format!(
                "{datetime}: {description}, {temp}°C, Wind {wind} m/s, Humidity {humidity}%",
                temp = entry.main.temp,
                wind = entry.wind.speed,
                humidity = entry.main.humidity,
            ));
            intervals.push(ForecastInterval {
                datetime,
                temp: entry.main.temp,
                description,
                wind: entry.wind.speed,
                humidity: entry.main.humidity,
            });
        }

        Self {
            intervals,
            readable: lines.join("\n"),
        }
    }
}
