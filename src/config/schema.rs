use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ranking::SUB_SCORE_COUNT;

/// Main configuration.
///
/// Example YAML:
/// ```yaml
/// competition: "제1회 서예대전"
/// judges: ["심사위원 1", "심사위원 2", "심사위원 3"]
/// theme: auto
/// data_dir: /srv/judging
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Competition name shown in titles and exports
    #[serde(default = "default_competition")]
    pub competition: String,

    /// Column labels for the three sub-scores, one per judge
    #[serde(default = "default_judges")]
    pub judges: Vec<String>,

    #[serde(default)]
    pub theme: ThemeMode,

    /// Where the scoresheet and schedule are stored (defaults to the config directory)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

fn default_competition() -> String {
    "서예대전".to_string()
}

fn default_judges() -> Vec<String> {
    (1..=SUB_SCORE_COUNT)
        .map(|n| format!("심사위원 {}", n))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            competition: default_competition(),
            judges: default_judges(),
            theme: ThemeMode::default(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Label for a 0-based judge column, falling back to "Judge N"
    pub fn judge_label(&self, slot: usize) -> String {
        self.judges
            .get(slot)
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Judge {}", slot + 1))
    }

    pub fn judge_labels(&self) -> Vec<String> {
        (0..SUB_SCORE_COUNT).map(|slot| self.judge_label(slot)).collect()
    }

    /// Store directory: `data_dir` if set, otherwise the config directory
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(crate::store::default_store_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.judges.len(), 3);
        assert_eq!(config.theme, ThemeMode::Auto);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            competition: "제3회 한글서예대전".to_string(),
            judges: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            theme: ThemeMode::Light,
            data_dir: Some(PathBuf::from("/tmp/judging")),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_parse() {
        let yaml = r#"
competition: "제1회 서예대전"
theme: dark
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.competition, "제1회 서예대전");
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.judges, default_judges());
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "competition: x\nqueries: []\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_judge_label_fallback() {
        let config = Config {
            judges: vec!["정".to_string(), " ".to_string()],
            ..Config::default()
        };
        assert_eq!(config.judge_labels(), vec!["정", "Judge 2", "Judge 3"]);
    }

    #[test]
    fn test_store_dir_override() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/judging")),
            ..Config::default()
        };
        assert_eq!(config.store_dir(), PathBuf::from("/srv/judging"));
    }
}
