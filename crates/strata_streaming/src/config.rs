//! # Configuration
//!
//! One TOML document describes a whole streamed world:
//!
//! ```toml
//! chunk_size = 256
//!
//! [noise]
//! seed = 12345
//! scale = 50.0
//! persistence = 0.5
//! lacunarity = 2.0
//! offset = [0.0, 0.0]
//! normalize_mode = "global"
//!
//! [streaming]
//! update_threshold = 25.0
//! worker_threads = 4
//! max_attempts = 2
//!
//! [[regions]]
//! name = "Water"
//! height = 0.4
//! colour = [0.2, 0.4, 0.8, 1.0]
//! ```
//!
//! Every table is optional; missing values fall back to the defaults and a
//! missing `regions` list means [`RegionTable::landmass`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_procedural::{ChunkGenerator, NoiseSettings, Region, RegionTable};

use crate::coordinator::{StreamingConfig, StreamingCoordinator};
use crate::error::{StreamingError, StreamingResult};
use crate::renderer::TerrainRenderer;

/// Default chunk edge length in world units.
pub const DEFAULT_CHUNK_SIZE: u32 = 256;

/// Full description of a streamed world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    /// Chunk edge length in world units.
    pub chunk_size: u32,
    /// Height field parameters.
    pub noise: NoiseSettings,
    /// Streaming parameters.
    pub streaming: StreamingConfig,
    /// Ordered height regions.
    pub regions: Vec<Region>,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            noise: NoiseSettings::default(),
            streaming: StreamingConfig::default(),
            regions: RegionTable::landmass().regions().to_vec(),
        }
    }
}

impl StrataConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidConfig`] for malformed TOML, or the
    /// validation error of the first bad section.
    pub fn from_toml_str(source: &str) -> StreamingResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StreamingError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::Io`] if the file cannot be read, otherwise
    /// as [`StrataConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> StreamingResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StreamingError::Io(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "loading world config");
        Self::from_toml_str(&source)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidConfig`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> StreamingResult<String> {
        toml::to_string(self).map_err(|e| StreamingError::InvalidConfig(e.to_string()))
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// The first validation error found.
    pub fn validate(&self) -> StreamingResult<()> {
        if self.chunk_size == 0 {
            return Err(StreamingError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if i64::try_from(self.noise.seed.value()).is_err() {
            return Err(StreamingError::InvalidConfig(format!(
                "seed {} does not fit in a TOML integer (max {})",
                self.noise.seed.value(),
                i64::MAX
            )));
        }
        self.noise.validate()?;
        self.streaming.validate()?;
        RegionTable::new(self.regions.clone())?;
        Ok(())
    }

    /// Builds the chunk generator described by this config.
    ///
    /// # Errors
    ///
    /// Any noise, region or chunk size error.
    pub fn generator(&self) -> StreamingResult<ChunkGenerator> {
        let regions = RegionTable::new(self.regions.clone())?;
        Ok(ChunkGenerator::new(self.noise.clone(), regions, self.chunk_size)?)
    }

    /// Builds a running coordinator for `renderer`.
    ///
    /// # Errors
    ///
    /// As [`StrataConfig::generator`] and [`StreamingCoordinator::new`].
    pub fn build<R: TerrainRenderer>(&self, renderer: R) -> StreamingResult<StreamingCoordinator<R>> {
        let generator = self.generator()?;
        StreamingCoordinator::new(self.streaming.clone(), generator, renderer)
    }
}
