use crate::clustering::forel::SeedPolicy;
use crate::clustering::sweep::SweepParams;
use crate::core::float::ForelFloat;
use crate::dataset::ParsePolicy;
use crate::distances::FieldSelector;
use crate::error::{ForelError, ForelResult};
use fxhash::FxHashMap;
use log::{error, LevelFilter};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Name of the profile used when a dataset has no profile of its own.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Identity used to look up normalization profiles.
    pub id: Option<String>,
    pub identifier_column: Option<String>,
    pub delimiter: char,
    pub features: FieldSelector,
    pub strict_parsing: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            id: None,
            identifier_column: Some("player".to_string()),
            delimiter: ',',
            features: FieldSelector::prefix("stat", &["stat54"]),
            strict_parsing: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub seed_index: Option<usize>,
    pub density_weighting: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed_index: Some(SeedPolicy::DEFAULT_FIRST_INDEX),
            density_weighting: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub trials: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { trials: 99 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NormalizationConstants {
    pub reference_weight: f64,
    pub radius_rate: f64,
}

/// Sweep constants for one dataset, per metric.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DatasetProfile {
    pub plain: NormalizationConstants,
    pub density: NormalizationConstants,
}

impl DatasetProfile {
    pub fn constants(&self, density_weighting: bool) -> NormalizationConstants {
        if density_weighting {
            self.density
        } else {
            self.plain
        }
    }
}

impl Default for DatasetProfile {
    fn default() -> Self {
        Self {
            plain: NormalizationConstants {
                reference_weight: 332.0,
                radius_rate: 100.0,
            },
            density: NormalizationConstants {
                reference_weight: 13.1,
                radius_rate: 1000.0,
            },
        }
    }
}

fn builtin_profiles() -> FxHashMap<String, DatasetProfile> {
    let mut profiles = FxHashMap::default();
    profiles.insert(DEFAULT_PROFILE.to_string(), DatasetProfile::default());
    profiles.insert(
        "player_stats_3.csv".to_string(),
        DatasetProfile {
            plain: NormalizationConstants {
                reference_weight: 21.0,
                radius_rate: 100.0,
            },
            density: NormalizationConstants {
                reference_weight: 1.9,
                radius_rate: 400.0,
            },
        },
    );
    profiles
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String, // Log level, e.g., "info", "debug", "warn", "error"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub clustering: ClusteringConfig,
    pub sweep: SweepConfig,
    pub profiles: FxHashMap<String, DatasetProfile>,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            clustering: ClusteringConfig::default(),
            sweep: SweepConfig::default(),
            profiles: builtin_profiles(),
            logging: LoggingConfig::default(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Dataset:")?;
        if let Some(id) = &self.dataset.id {
            writeln!(f, "    Id: {}", id)?;
        } else {
            writeln!(f, "    Id: None")?;
        }
        if let Some(column) = &self.dataset.identifier_column {
            writeln!(f, "    Identifier Column: {}", column)?;
        } else {
            writeln!(f, "    Identifier Column: None")?;
        }
        writeln!(f, "    Delimiter: {:?}", self.dataset.delimiter)?;
        writeln!(f, "    Features: {:?}", self.dataset.features)?;
        writeln!(f, "    Strict Parsing: {}", self.dataset.strict_parsing)?;
        writeln!(f, "  Clustering:")?;
        match self.clustering.seed_index {
            Some(idx) => writeln!(f, "    Seed Index: {}", idx)?,
            None => writeln!(f, "    Seed Index: None")?,
        }
        writeln!(
            f,
            "    Density Weighting: {}",
            self.clustering.density_weighting
        )?;
        writeln!(f, "  Sweep Trials: {}", self.sweep.trials)?;
        let mut names: Vec<&String> = self.profiles.keys().collect();
        names.sort();
        writeln!(f, "  Profiles:")?;
        for name in names {
            let profile = &self.profiles[name];
            writeln!(
                f,
                "    {}: plain {}/{}, density {}/{}",
                name,
                profile.plain.reference_weight,
                profile.plain.radius_rate,
                profile.density.reference_weight,
                profile.density.radius_rate
            )?;
        }
        writeln!(f, "  Logging:")?;
        writeln!(f, "    Level: {}", self.logging.level)?;
        Ok(())
    }
}

impl Config {
    /// Reads the YAML configuration file and returns a `Config` instance.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> ForelResult<Self> {
        let file_content = std::fs::read_to_string(file_path)?;
        Self::from_yaml_str(&file_content)
    }

    /// Parses YAML; sections left out keep their defaults and a missing
    /// `default` profile is filled in with the built-in constants.
    pub fn from_yaml_str(yaml: &str) -> ForelResult<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config
            .profiles
            .entry(DEFAULT_PROFILE.to_string())
            .or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ForelResult<()> {
        if !self.dataset.delimiter.is_ascii() {
            return Err(ForelError::Configuration(format!(
                "delimiter {:?} must be a single ASCII character",
                self.dataset.delimiter
            )));
        }

        if self.sweep.trials == 0 {
            return Err(ForelError::Configuration(
                "sweep.trials must be greater than 0".to_string(),
            ));
        }

        for (name, profile) in &self.profiles {
            for constants in [profile.plain, profile.density] {
                if !(constants.reference_weight > 0.0 && constants.radius_rate > 0.0) {
                    return Err(ForelError::Configuration(format!(
                        "profile `{}` needs positive reference_weight and radius_rate",
                        name
                    )));
                }
            }
        }

        if self.logging.level.parse::<LevelFilter>().is_err() {
            return Err(ForelError::Configuration(format!(
                "Unsupported log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    pub fn delimiter(&self) -> u8 {
        // validate() guarantees ASCII.
        self.dataset.delimiter as u8
    }

    pub fn parse_policy(&self) -> ParsePolicy {
        if self.dataset.strict_parsing {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Lenient
        }
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        SeedPolicy {
            first_index: self.clustering.seed_index,
        }
    }

    /// The profile for `dataset_id`, or the default profile.
    pub fn profile(&self, dataset_id: &str) -> DatasetProfile {
        self.profiles
            .get(dataset_id)
            .or_else(|| self.profiles.get(DEFAULT_PROFILE))
            .copied()
            .unwrap_or_default()
    }

    /// Converts the profile for `dataset_id` into `SweepParams`.
    pub fn sweep_params<F: ForelFloat>(
        &self,
        dataset_id: &str,
        density_weighting: bool,
    ) -> ForelResult<SweepParams<F>> {
        let constants = self.profile(dataset_id).constants(density_weighting);
        let convert = |value: f64, name: &str| {
            F::from_f64(value).ok_or_else(|| {
                ForelError::Configuration(format!("{} {} is not representable", name, value))
            })
        };
        Ok(SweepParams {
            radius_rate: convert(constants.radius_rate, "radius_rate")?,
            reference_weight: convert(constants.reference_weight, "reference_weight")?,
            trials: self.sweep.trials,
        })
    }

    /// Sets up logging based on the logging level in the configuration.
    pub fn setup_logging(&self) {
        let level_filter = self
            .logging
            .level
            .parse::<LevelFilter>()
            .unwrap_or(LevelFilter::Info);

        if let Err(e) = env_logger::Builder::new()
            .filter_level(level_filter)
            .try_init()
        {
            error!("Failed to initialize logger: {}", e);
        }
    }
}
