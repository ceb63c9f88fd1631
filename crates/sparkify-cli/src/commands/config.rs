use anyhow::{Context, Result};
use sparkify_etl::{config, Compression, Config, TimeBasis};
use toml_edit::{value, DocumentMut, Item, Table};

const VALID_KEYS: &[&str] = &[
    "input_root",
    "output_root",
    "time_basis",
    "compression",
    "storage.access_key_id",
    "storage.secret_access_key",
    "storage.session_token",
    "storage.region",
    "storage.endpoint",
    "compat.hour_as_year",
];

const NOT_SET: &str = "<not set>";

fn mask(secret: Option<&str>) -> &'static str {
    match secret {
        Some(_) => "********",
        None => NOT_SET,
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {}\n\nValid keys: {}",
        key,
        VALID_KEYS.join(", ")
    )
}

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  input_root: {}", config.input_root);
    println!("  output_root: {}", config.output_root);
    println!("  time_basis: {}", config.time_basis);
    println!("  compression: {}", config.compression);
    println!(
        "  storage.access_key_id: {}",
        config.storage.access_key_id.as_deref().unwrap_or(NOT_SET)
    );
    println!(
        "  storage.secret_access_key: {}",
        mask(config.storage.secret_access_key.as_deref())
    );
    println!(
        "  storage.session_token: {}",
        mask(config.storage.session_token.as_deref())
    );
    println!(
        "  storage.region: {}",
        config.storage.region.as_deref().unwrap_or(NOT_SET)
    );
    println!(
        "  storage.endpoint: {}",
        config.storage.endpoint.as_deref().unwrap_or(NOT_SET)
    );
    println!("  compat.hour_as_year: {}", config.compat.hour_as_year);
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (SPARKIFY_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    let Some(key) = key else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'sparkify config init' to create it.");
        }
        return Ok(());
    };

    let config = Config::load()?;
    let storage = &config.storage;
    let shown = match key.as_str() {
        "input_root" => config.input_root.clone(),
        "output_root" => config.output_root.clone(),
        "time_basis" => config.time_basis.to_string(),
        "compression" => config.compression.to_string(),
        "storage.access_key_id" => storage.access_key_id.clone().unwrap_or_else(|| NOT_SET.into()),
        "storage.secret_access_key" => mask(storage.secret_access_key.as_deref()).to_string(),
        "storage.session_token" => mask(storage.session_token.as_deref()).to_string(),
        "storage.region" => storage.region.clone().unwrap_or_else(|| NOT_SET.into()),
        "storage.endpoint" => storage.endpoint.clone().unwrap_or_else(|| NOT_SET.into()),
        "compat.hour_as_year" => config.compat.hour_as_year.to_string(),
        _ => return Err(unknown_key(&key)),
    };
    println!("{}", shown);

    Ok(())
}

/// Set a config value.
pub fn set_config(key: &str, new_value: &str) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let updated = update_document(&contents, key, new_value)?;

    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, new_value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Rewrites one key in a config document, keeping comments and layout.
fn update_document(contents: &str, key: &str, new_value: &str) -> Result<String> {
    if !VALID_KEYS.contains(&key) {
        return Err(unknown_key(key));
    }

    let item = match key {
        "time_basis" => {
            let basis: TimeBasis = new_value.parse().map_err(anyhow::Error::msg)?;
            value(basis.as_str())
        }
        "compression" => {
            let compression: Compression = new_value.parse().map_err(anyhow::Error::msg)?;
            value(compression.to_string())
        }
        "compat.hour_as_year" => {
            let flag: bool = new_value
                .parse()
                .with_context(|| format!("{key} must be true or false"))?;
            value(flag)
        }
        _ => value(new_value),
    };

    let mut doc: DocumentMut = contents.parse().context("Failed to parse config file")?;
    match key.split_once('.') {
        Some((section, field)) => {
            if !doc.contains_key(section) {
                doc.insert(section, Item::Table(Table::new()));
            }
            let table = doc[section]
                .as_table_mut()
                .with_context(|| format!("[{section}] in the config file is not a table"))?;
            table.insert(field, item);
        }
        None => {
            doc.insert(key, item);
        }
    }

    Ok(doc.to_string())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure sparkify.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
