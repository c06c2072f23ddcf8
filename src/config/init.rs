use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, validate_config, Config, ThemeMode};
use crate::ranking::SUB_SCORE_COUNT;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse a theme name as typed in the wizard.
fn parse_theme(input: &str) -> Option<ThemeMode> {
    match input.trim().to_lowercase().as_str() {
        "auto" => Some(ThemeMode::Auto),
        "dark" => Some(ThemeMode::Dark),
        "light" => Some(ThemeMode::Light),
        _ => None,
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("서예 심사 설정 / Scoresheet setup");
    println!("================================");
    println!();

    let defaults = Config::default();

    // 1. Competition
    let competition = loop {
        let input = prompt_with_default("Competition name", &defaults.competition)?;
        if !input.trim().is_empty() {
            break input;
        }
        println!("  Competition name is required.");
    };

    // 2. Judge columns
    println!();
    println!("Each work is scored by {} judges, 0 to 100 each.", SUB_SCORE_COUNT);
    let mut judges = Vec::with_capacity(SUB_SCORE_COUNT);
    for slot in 0..SUB_SCORE_COUNT {
        let label = prompt_with_default(
            &format!("Label for judge {}", slot + 1),
            &defaults.judge_label(slot),
        )?;
        judges.push(label);
    }

    // 3. Theme
    println!();
    let theme = loop {
        let input = prompt_with_default("Theme (auto, dark, light)", "auto")?;
        match parse_theme(&input) {
            Some(theme) => break theme,
            None => println!("  Invalid theme '{}'. Try again.", input),
        }
    };

    // 4. Data directory
    println!();
    let default_data_dir = crate::store::default_store_dir();
    let data_dir_str = prompt_with_default(
        "Where should scoresheets be stored?",
        &default_data_dir.display().to_string(),
    )?;
    let data_dir = PathBuf::from(&data_dir_str);
    let data_dir = if data_dir == default_data_dir {
        None
    } else {
        Some(data_dir)
    };

    let config = Config {
        competition,
        judges,
        theme,
        data_dir,
    };

    if let Err(errors) = validate_config(&config) {
        println!();
        println!("Configuration is invalid:");
        for error in errors {
            println!("  - {}", error);
        }
        println!("Aborted.");
        return Ok(());
    }

    // 5. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 6. Write config
    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `seoye-judge add <name>` to enter the first work, or `seoye-judge tui`.");

    Ok(())
}
