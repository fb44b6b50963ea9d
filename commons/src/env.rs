const CONFIG_DIR: &str = ".credport";
const CONFIG_FILE: &str = "config.env";

pub fn load_env() {
    // Load .env from current directory first (highest priority)
    let _ = dotenv::dotenv();

    // Load ~/.credport/config.env as defaults (won't overwrite existing)
    if let Ok(home) = std::env::var("HOME") {
        let config_path = format!("{}/{}/{}", home, CONFIG_DIR, CONFIG_FILE);
        let _ = dotenv::from_filename(config_path);
    }
}

pub fn load_env_from_paths(local_env: &std::path::Path, default_config: &std::path::Path) {
    let _ = dotenv::from_filename(local_env);
    let _ = dotenv::from_filename(default_config);
}

pub fn config_dir() -> String {
    if let Ok(home) = std::env::var("HOME") {
        format!("{}/{}", home, CONFIG_DIR)
    } else {
        CONFIG_DIR.to_string()
    }
}
