use config::{Config, ConfigError, Environment, File, FileFormat};
use lineup_optimizer::OptimizationConfig;
use player_pool::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables override settings as `LINEUP__SECTION__KEY`
pub const ENV_PREFIX: &str = "LINEUP";

/// Sleeper weekly projections; `{season}` and `{week}` are filled in
pub const DEFAULT_PROJECTIONS_URL: &str = concat!(
    "https://api.sleeper.app/projections/nfl/{season}/{week}?season_type=regular",
    "&position%5B%5D=DEF&position%5B%5D=K&position%5B%5D=RB",
    "&position%5B%5D=QB&position%5B%5D=TE&position%5B%5D=WR",
    "&order_by=ppr",
);

/// DraftKings draftables for one draft group; `{draft_group_id}` is filled in
pub const DEFAULT_SLATE_URL: &str =
    "https://api.draftkings.com/draftgroups/v1/draftgroups/{draft_group_id}/draftables";

/// Everything the CLI needs for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feeds: FeedSettings,
    pub solver: SolverSettings,
    pub logging: LoggingSettings,
    pub resolver: ResolverConfig,
    pub optimization: OptimizationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Projection feed URL template
    pub projections_url: String,

    /// Slate feed URL template
    pub slate_url: String,

    pub season: u32,
    pub week: u32,

    /// DraftKings draft group to optimize; required unless the slate is read
    /// from a file
    pub draft_group_id: Option<u64>,

    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            projections_url: DEFAULT_PROJECTIONS_URL.to_string(),
            slate_url: DEFAULT_SLATE_URL.to_string(),
            season: 2023,
            week: 18,
            draft_group_id: None,
            http_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Wall-clock limit for one solve; hitting it fails the run
    pub timeout_secs: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Settings {
    /// Layer built-in defaults, an optional TOML file and `LINEUP__*`
    /// environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        Self::finish(builder)
    }

    /// Same layering with the file contents given inline
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::finish(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_pool::Position;

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(settings.feeds.season, 2023);
        assert_eq!(settings.feeds.week, 18);
        assert_eq!(settings.feeds.draft_group_id, None);
        assert_eq!(settings.solver.timeout_secs, 120);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.resolver.scoring_stat_attribute_id, 90);
        assert_eq!(settings.resolver.name_prefix_len, 15);
        assert_eq!(settings.optimization.rules.salary_cap, 50_000);
    }

    #[test]
    fn test_toml_overrides_nested_sections() {
        let settings = Settings::from_toml_str(
            r#"
            [feeds]
            week = 3
            draft_group_id = 98582

            [solver]
            timeout_secs = 15

            [optimization]
            flex_position_preference = "TE"
            qb_stack_positions = ["WR", "TE"]
            forced_exclude = ["11370"]
            exclude_opponents_of_starting_dst = true

            [optimization.rules]
            salary_cap = 60000
            "#,
        )
        .unwrap();

        assert_eq!(settings.feeds.week, 3);
        assert_eq!(settings.feeds.season, 2023);
        assert_eq!(settings.feeds.draft_group_id, Some(98582));
        assert_eq!(settings.solver.timeout_secs, 15);

        let optimization = &settings.optimization;
        assert_eq!(optimization.flex_position_preference, Some(Position::TE));
        assert_eq!(optimization.qb_stack_positions.len(), 2);
        assert!(optimization.forced_exclude.contains("11370"));
        assert!(optimization.exclude_opponents_of_starting_dst);
        assert_eq!(optimization.rules.salary_cap, 60_000);
        assert_eq!(optimization.rules.roster_size, 9);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/lineup.toml"))).is_err());
    }

    #[test]
    fn test_bad_position_is_rejected() {
        let result = Settings::from_toml_str(
            r#"
            [optimization]
            flex_position_preference = "K"
            "#,
        );
        assert!(result.is_err());
    }
}
