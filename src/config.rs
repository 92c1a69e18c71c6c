//! Analysis settings loaded from TOML
//!
//! ```toml
//! [extract]
//! marker = 210
//! label = "eyes closed"
//! trailing = "recording_end"
//!
//! [psd]
//! f_max = 45.0
//!
//! [bandpass]
//! low = 1.0
//! high = 45.0
//!
//! [notch]
//! freq = 50.0
//! ```
//!
//! Every section and field is optional and falls back to the tutorial
//! defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EegError, Result};
use crate::extract::ExtractOptions;
use crate::filter::{BandpassConfig, NotchConfig};
use crate::spectrum::WelchParams;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub extract: ExtractOptions,
    pub psd: WelchParams,
    pub bandpass: BandpassConfig,
    pub notch: NotchConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(s).map_err(|e| EegError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        log::debug!("Loading analysis config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    /// Checks the settings that do not depend on a sampling rate
    pub fn validate(&self) -> Result<()> {
        self.extract.validate()?;
        self.psd.validate()?;

        let bp = &self.bandpass;
        if bp.order == 0 || !(bp.low > 0.0 && bp.low < bp.high) {
            return Err(EegError::Config(format!(
                "Bandpass needs order >= 1 and 0 < low < high, got order {} [{}, {}]",
                bp.order, bp.low, bp.high
            )));
        }
        if !(self.notch.freq > 0.0 && self.notch.q > 0.0) {
            return Err(EegError::Config(format!(
                "Notch needs positive frequency and Q, got {} Hz Q={}",
                self.notch.freq, self.notch.q
            )));
        }

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| EegError::Config(e.to_string()))
    }
}
