//! Configuration management for timeblock.
//!
//! The configuration lives in `config.json` inside the platform data directory
//! and is split into optional sections, each configured on its own:
//!
//! - **User**: the identity whose tasks and time logs the timer tracks
//! - **Sound**: whether the prompt alert repeats, and how often
//! - **Timer**: the logical tick interval of the live timer and how often it
//!   checks the database for changes made by other processes
//!
//! A missing file is not an error: every section falls back to its defaults,
//! except the user identity, without which the timer runs locally only and
//! `start` does nothing.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use timeblock::libs::config::Config;
//!
//! let config = Config::read()?;
//! let sound = config.sound.unwrap_or_default();
//! println!("alert repeats: {}", sound.repeat);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::time::Duration;

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// A section offered by the interactive setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// The identity the timer acts for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserConfig {
    pub user_id: String,
}

/// Prompt alert behaviour.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SoundConfig {
    /// Repeat the alert while any prompt stays visible.
    #[serde(default)]
    pub repeat: bool,

    /// Seconds between repeated alerts.
    #[serde(default = "default_repeat_secs")]
    pub repeat_secs: u64,
}

fn default_repeat_secs() -> u64 {
    5
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig {
            repeat: false,
            repeat_secs: default_repeat_secs(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    /// Milliseconds between logical clock ticks of the live timer.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Milliseconds between checks of the database for time logs opened or
    /// closed by another process.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_poll_ms() -> u64 {
    2000
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            tick_ms: default_tick_ms(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl TimerConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(100))
    }
}

/// Top-level application configuration.
///
/// Unset sections are omitted from the JSON file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<SoundConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerConfig>,
}

impl Config {
    /// Reads the configuration from the default data directory.
    ///
    /// Returns the default configuration when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    pub fn read_from(data_storage: &DataStorage) -> Result<Config> {
        let config_file_path = data_storage.get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, data_storage: &DataStorage) -> Result<()> {
        let config_file_path = data_storage.get_path(CONFIG_FILE_NAME)?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    pub fn user_id(&self) -> Option<String> {
        self.user
            .as_ref()
            .map(|user| user.user_id.trim().to_string())
            .filter(|user_id| !user_id.is_empty())
    }

    /// Runs the interactive setup wizard.
    ///
    /// Existing values are offered as defaults. Only the sections the user
    /// selects are asked about; the rest are kept as they were.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = [
            ConfigModule {
                key: "user".to_string(),
                name: "User".to_string(),
            },
            ConfigModule {
                key: "sound".to_string(),
                name: "Sound".to_string(),
            },
            ConfigModule {
                key: "timer".to_string(),
                name: "Timer".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for index in selected {
            let module = &modules[index];
            msg_print!(Message::ConfigModuleHeader(module.name.clone()), true);

            match module.key.as_str() {
                "user" => {
                    let current = config.user.clone().map(|user| user.user_id).unwrap_or_default();
                    config.user = Some(UserConfig {
                        user_id: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptUserId.to_string())
                            .with_initial_text(current)
                            .interact_text()?,
                    });
                }
                "sound" => {
                    let current = config.sound.clone().unwrap_or_default();
                    let repeat = Confirm::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptAlertRepeat.to_string())
                        .default(current.repeat)
                        .interact()?;
                    let repeat_secs = if repeat {
                        Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptAlertRepeatSecs.to_string())
                            .default(current.repeat_secs)
                            .interact_text()?
                    } else {
                        current.repeat_secs
                    };
                    config.sound = Some(SoundConfig { repeat, repeat_secs });
                }
                "timer" => {
                    let current = config.timer.clone().unwrap_or_default();
                    config.timer = Some(TimerConfig {
                        tick_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTickMs.to_string())
                            .default(current.tick_ms)
                            .interact_text()?,
                        poll_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptPollMs.to_string())
                            .default(current.poll_ms)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
