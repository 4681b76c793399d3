use memos::config::{is_known_key, MemosConfig, CONFIG_KEYS};

/// Run the config command
pub fn run_config(key: Option<&str>, value: Option<&str>) -> Result<(), String> {
    let mut config = MemosConfig::load();

    match (key, value) {
        (None, None) => {
            // Show current config
            println!("Configuration ({}):\n", config.path().display());
            for k in CONFIG_KEYS {
                let v = config.get(k.name).unwrap_or("(not set)");
                println!("  {:16} {}", k.name, v);
                println!("  {:16} {}", "", k.description);
            }
            let extra: Vec<(&str, &str)> = config
                .entries()
                .filter(|(k, _)| !is_known_key(k))
                .collect();
            if !extra.is_empty() {
                println!("\nUnrecognized keys:");
                for (k, v) in extra {
                    println!("  {:16} {}", k, v);
                }
            }
            println!("\nNotebook: {}", config.notebook_path(None).display());
        }
        (Some(k), None) => match config.get(k) {
            Some(v) => println!("{}: {}", k, v),
            None => println!("{}: (not set)", k),
        },
        (Some(k), Some(v)) => {
            if !is_known_key(k) {
                let known: Vec<&str> = CONFIG_KEYS.iter().map(|k| k.name).collect();
                return Err(format!("Unknown key: {} (expected one of {})", k, known.join(", ")));
            }
            if k == "case_sensitive" && !matches!(v, "true" | "false") {
                return Err("case_sensitive must be true or false".to_string());
            }

            config.set(k, v).map_err(|e| format!("Failed to save: {}", e))?;
            println!("Set {} = {}", k, v);
        }
        (None, Some(_)) => {
            return Err("Key required when setting a value".to_string());
        }
    }

    Ok(())
}
