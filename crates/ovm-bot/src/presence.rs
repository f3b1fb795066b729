use chrono::{Datelike, Local, Timelike};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::config::PresenceConfig;
use crate::platform::GuildHandle;

#[derive(Error, Debug)]
pub enum PresenceError {
    #[error("Weather request failed: {0}")]
    Weather(#[from] reqwest::Error),
    
    #[error("Weather report has no current condition")]
    MissingCondition,
    
    #[error("Failed to rename guild: {0}")]
    Rename(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PresenceError>;

// Only the fields the updater reads; wttr.in sends far more.
#[derive(Debug, Deserialize)]
struct WeatherReport {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

/// Client for a wttr.in compatible weather service
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    location: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            location: location.into(),
        }
    }
    
    pub fn report_url(&self) -> String {
        format!(
            "{}/{}?format=j1",
            self.base_url.trim_end_matches('/'),
            self.location
        )
    }
    
    /// Current condition text, e.g. "Partly cloudy"
    pub async fn current_condition(&self) -> Result<String> {
        let report: WeatherReport = self
            .http
            .get(self.report_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        
        report
            .current_condition
            .into_iter()
            .next()
            .and_then(|current| current.weather_desc.into_iter().next())
            .map(|desc| desc.value)
            .ok_or(PresenceError::MissingCondition)
    }
}

/// Daytime name for a weather condition, matched exactly after trimming.
/// Unknown conditions map to `None`.
pub fn weather_name(condition: &str, brand: &str) -> Option<String> {
    let icon = match condition.trim() {
        "Sunny" => "☀",
        "Partly cloudy" => "☁",
        "Light rain shower" | "Rain shower" => "🌧️",
        _ => return None,
    };
    Some(format!("{} {}", icon, brand))
}

/// Length of the simplified lunar cycle, in days
pub const MOON_CYCLE_DAYS: u32 = 29;

pub fn moon_phase_name(day_of_month: u32, brand: &str) -> String {
    let phase = day_of_month % MOON_CYCLE_DAYS;
    let icon = if phase < 7 {
        "🌑"
    } else if phase < 14 {
        "🌒"
    } else if phase < 21 {
        "🌕"
    } else {
        "🌖"
    };
    format!("{} {}", icon, brand)
}

/// Local hours counted as day: `start_hour <= hour < end_hour`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl DayWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

pub struct PresenceUpdater {
    weather: WeatherClient,
    guild: Arc<dyn GuildHandle>,
    window: DayWindow,
    brand: String,
    interval: Duration,
}

impl PresenceUpdater {
    pub fn new(weather: WeatherClient, guild: Arc<dyn GuildHandle>, config: &PresenceConfig) -> Self {
        Self {
            weather,
            guild,
            window: DayWindow {
                start_hour: config.day_start_hour,
                end_hour: config.day_end_hour,
            },
            brand: config.brand.clone(),
            interval: Duration::from_secs(config.interval_secs.max(1)),
        }
    }
    
    pub fn from_config(config: &PresenceConfig, guild: Arc<dyn GuildHandle>) -> Self {
        let weather = WeatherClient::new(&config.weather_url, &config.location);
        Self::new(weather, guild, config)
    }
    
    /// Name the server should carry at `hour` on `day_of_month`.
    /// The weather service is only consulted during the day.
    pub async fn desired_name(&self, hour: u32, day_of_month: u32) -> Result<Option<String>> {
        if !self.window.contains(hour) {
            return Ok(Some(moon_phase_name(day_of_month, &self.brand)));
        }
        
        let condition = self.weather.current_condition().await?;
        let name = weather_name(&condition, &self.brand);
        if name.is_none() {
            info!(condition = %condition, "No server name for this weather, leaving it unchanged");
        }
        Ok(name)
    }
    
    /// One update at the given local time. Returns the name applied, if any.
    pub async fn run_cycle_at(&self, hour: u32, day_of_month: u32) -> Result<Option<String>> {
        let Some(name) = self.desired_name(hour, day_of_month).await? else {
            return Ok(None);
        };
        
        self.guild.rename(&name).await.map_err(PresenceError::Rename)?;
        info!(name = %name, "Server name updated");
        Ok(Some(name))
    }
    
    pub async fn run_cycle(&self) -> Result<Option<String>> {
        let now = Local::now();
        self.run_cycle_at(now.hour(), now.day()).await
    }
    
    /// Update forever. The first cycle runs immediately; failures are logged
    /// and the next tick tries again.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        
        info!(interval_secs = self.interval.as_secs(), "Presence updater started");
        
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_cycle().await {
                error!(error = %e, "Presence update failed");
            }
        }
    }
}
