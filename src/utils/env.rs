// src/utils/env.rs
use log::debug;

/// Load variables from a `.env` file in the working directory (or a parent)
/// if one exists. Variables already set in the process environment win.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found, using process environment only"),
    }
}

/// Read and parse an environment variable, falling back to `default` when it
/// is missing or malformed.
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Read a string variable, treating an empty value as unset.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
