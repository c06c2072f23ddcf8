use super::schema::Config;
use crate::ranking::SUB_SCORE_COUNT;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.competition.trim().is_empty() {
        errors.push("competition: must not be empty".to_string());
    }

    if config.judges.len() != SUB_SCORE_COUNT {
        errors.push(format!(
            "judges: expected exactly {} labels, found {}",
            SUB_SCORE_COUNT,
            config.judges.len()
        ));
    }

    for (i, label) in config.judges.iter().enumerate() {
        if label.trim().is_empty() {
            errors.push(format!("judges[{}]: must not be empty", i));
        }
    }

    if let Some(ref dir) = config.data_dir {
        if dir.as_os_str().is_empty() {
            errors.push("data_dir: must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_wrong_judge_count() {
        let config = Config {
            judges: vec!["A".to_string(), "B".to_string()],
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("judges: expected exactly 3"));
    }

    #[test]
    fn test_blank_judge_label() {
        let config = Config {
            judges: vec!["A".to_string(), "".to_string(), "C".to_string()],
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec!["judges[1]: must not be empty".to_string()]);
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config {
            competition: " ".to_string(),             // Error 1
            judges: vec!["".to_string()],             // Errors 2 and 3
            data_dir: Some(PathBuf::new()),           // Error 4
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
