/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Engine configuration, loaded from JSON5.

use crate::approximation::BloomTopicHasher;
use crate::observability::events;
use ddata_api::{ReadConsistency, WriteConsistency};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::info;

const COMPONENT: &str = "config";

const DEFAULT_BLOOM_BYTES: usize = 64;
const DEFAULT_HASH_COUNT: usize = 3;
const DEFAULT_FLUSH_INTERVAL_MS: u64 = 500;
const DEFAULT_FORCE_RESYNC_PROBABILITY: f64 = 0.01;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PubSubConfig {
    pub approximation: ApproximationConfig,
    pub flush: FlushConfig,
    pub write_consistency: WriteConsistency,
    pub read_consistency: ReadConsistency,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ApproximationConfig {
    pub mode: ApproximationMode,
    pub bytes: usize,
    pub hash_count: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApproximationMode {
    #[default]
    Bloom,
    Literal,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FlushConfig {
    pub interval_ms: u64,
    pub force_resync_probability: f64,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config: {err}"),
            ConfigError::Parse(reason) => write!(f, "unable to parse config: {reason}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(_) | ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl Default for ApproximationConfig {
    fn default() -> Self {
        Self {
            mode: ApproximationMode::Bloom,
            bytes: DEFAULT_BLOOM_BYTES,
            hash_count: DEFAULT_HASH_COUNT,
        }
    }
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            force_resync_probability: DEFAULT_FORCE_RESYNC_PROBABILITY,
        }
    }
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            approximation: ApproximationConfig::default(),
            flush: FlushConfig::default(),
            write_consistency: WriteConsistency::Local,
            read_consistency: ReadConsistency::Local,
        }
    }
}

impl FlushConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl PubSubConfig {
    /// Parses and validates a JSON5 document.
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PubSubConfig =
            json5::from_str(contents).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json5_str(&contents)?;
        info!(
            event = events::CONFIG_LOADED,
            component = COMPONENT,
            path = %path.display(),
            mode = ?config.approximation.mode,
            "loaded pubsub config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.approximation.mode == ApproximationMode::Bloom {
            if self.approximation.bytes == 0 {
                return Err(ConfigError::Invalid(
                    "approximation.bytes must be greater than 0".to_string(),
                ));
            }
            if self.approximation.hash_count == 0 {
                return Err(ConfigError::Invalid(
                    "approximation.hash_count must be greater than 0".to_string(),
                ));
            }
        }
        if self.flush.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "flush.interval_ms must be greater than 0".to_string(),
            ));
        }
        let probability = self.flush.force_resync_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::Invalid(format!(
                "flush.force_resync_probability must be within [0, 1], got {probability}"
            )));
        }
        Ok(())
    }

    /// Bloom hasher for the configured parameters; `None` in literal mode.
    pub fn bloom_hasher(&self) -> Option<BloomTopicHasher> {
        match self.approximation.mode {
            ApproximationMode::Bloom => Some(BloomTopicHasher::new(
                self.approximation.bytes,
                self.approximation.hash_count,
            )),
            ApproximationMode::Literal => None,
        }
    }
}
