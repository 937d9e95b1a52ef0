use anyhow::{Context, Result};
use serde::Deserialize;

use crate::audio::AudioSourceConfig;
use crate::protocol::TurnMode;
use crate::session::SessionConfig;
use crate::vad::VadConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub endpoint: EndpointConfig,
    pub session: SessionSettings,
    pub vad: VadConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "turn-interpreter".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: SessionConfig::default().endpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub from: String,
    pub to: String,
    pub mode: TurnMode,
    pub sample_rate: u32,
    pub client_vad: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            from: defaults.from_language,
            to: defaults.to_language,
            mode: defaults.mode,
            sample_rate: defaults.sample_rate,
            client_vad: defaults.client_vad,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frame length fed to the session
    pub frame_ms: u32,
    /// Replay files at wall-clock speed
    pub realtime: bool,
    /// How long to keep listening for results after the input ends
    pub tail_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_ms: 100,
            realtime: true,
            tail_ms: 3000,
        }
    }
}

impl Config {
    /// Load `path` (any extension the `config` crate understands) plus
    /// `TURN_INTERPRETER__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("TURN_INTERPRETER").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    /// Defaults plus environment overrides, for running without a file
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("TURN_INTERPRETER").separator("__"))
            .build()
            .context("Failed to read environment config")?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.endpoint.url.clone(),
            from_language: self.session.from.clone(),
            to_language: self.session.to.clone(),
            mode: self.session.mode,
            sample_rate: self.session.sample_rate,
            client_vad: self.session.client_vad,
            vad: self.vad.clone(),
        }
    }

    pub fn source_config(&self) -> AudioSourceConfig {
        AudioSourceConfig {
            sample_rate: self.session.sample_rate,
            frame_ms: self.capture.frame_ms,
            realtime: self.capture.realtime,
        }
    }
}
