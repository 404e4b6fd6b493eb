use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{endpoint, SourceError, WeatherSource, TARGET};
use crate::config::WeatherConfig;

/// Current conditions for one city, metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Deserialize)]
struct Wire {
    name: String,
    #[serde(default)]
    sys: WireSys,
    main: WireMain,
    #[serde(default)]
    weather: Vec<WireCondition>,
    #[serde(default)]
    wind: WireWind,
}

#[derive(Debug, Default, Deserialize)]
struct WireSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireWind {
    #[serde(default)]
    speed: f64,
}

pub(crate) fn parse_report(body: &str) -> Result<WeatherReport, SourceError> {
    let wire: Wire = serde_json::from_str(body)?;
    Ok(WeatherReport {
        city: wire.name,
        country: wire.sys.country,
        temperature: wire.main.temp,
        feels_like: wire.main.feels_like,
        description: wire
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default(),
        humidity: wire.main.humidity,
        wind_speed: wire.wind.speed,
    })
}

/// OpenWeather "current weather" endpoint.
pub struct OpenWeatherClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(client: Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<Option<WeatherReport>, SourceError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingApiKey)?;
        let url = endpoint(&self.config.api_base, &["weather"])?;
        debug!(target: TARGET, %city, "fetching weather");
        let response = self
            .client
            .get(url.clone())
            .query(&[("q", city), ("appid", key), ("units", "metric")])
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(None),
            status if status.is_success() => {
                let body = response.text().await?;
                parse_report(&body).map(Some)
            }
            status => Err(SourceError::Status {
                status: status.as_u16(),
                endpoint: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_conditions() {
        let report = parse_report(
            r#"{"coord":{"lon":-0.13,"lat":51.51},
                "weather":[{"id":500,"main":"Rain","description":"light rain","icon":"10d"}],
                "main":{"temp":11.62,"feels_like":10.9,"temp_min":10.1,"pressure":1012,"humidity":81},
                "wind":{"speed":4.63,"deg":230},
                "sys":{"country":"GB"},
                "name":"London","cod":200}"#,
        )
        .expect("decode");
        assert_eq!(report.city, "London");
        assert_eq!(report.country.as_deref(), Some("GB"));
        assert_eq!(report.description, "light rain");
        assert_eq!(report.humidity, 81);
        assert_eq!(report.wind_speed, 4.63);
    }

    #[test]
    fn tolerates_missing_optional_sections() {
        let report = parse_report(
            r#"{"main":{"temp":1.0,"feels_like":-2.0,"humidity":90},"name":"Nuuk"}"#,
        )
        .expect("decode");
        assert_eq!(report.country, None);
        assert_eq!(report.description, "");
        assert_eq!(report.wind_speed, 0.0);
    }
}
