//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

use lingvo_time::config::{Config, write_atomic};

/// Default configuration content for `lingvo-time init`
pub const DEFAULT_CONFIG: &str = r#"# Lingvo Time Configuration
# =========================
#
# Earn play time by solving word puzzles and arithmetic problems.

# ============================================================================
# SETTINGS - Server and storage
# ============================================================================

[settings]
# Local HTTP API port (`lingvo-time serve`)
http_port = 8642
# Optional: shared secret required on API requests (sent as `X-Lingvo-Token`)
# Leave empty to disable auth
http_token = ""
# SQLite database; defaults to ~/.lingvo-time/games.db
# db_path = "/path/to/games.db"

# ============================================================================
# GAME - Exercise generation
# ============================================================================

[game]
# Directory with level1.txt .. level9.txt word lists (one word per line).
# Missing files fall back to the built-in lists.
# word_list_dir = "/path/to/words"
# Fixed seed for reproducible sessions
# seed = 42

# ============================================================================
# REWARD - Play time earned per correct answer
# ============================================================================
#
#   elapsed - seconds spent on the exercise x complexity (default)
#   flat    - flat_seconds x complexity

[reward]
policy = "elapsed"
flat_seconds = 60.0

# ============================================================================
# ILLUSTRATIONS - Images shown next to the verdict
# ============================================================================
#
# The endpoint is queried as GET {endpoint}?q=correct&limit=5 and must answer
# with a JSON array of image URLs (or {"urls": [...]}).

[illustrations]
enabled = false
endpoint = ""
limit = 5
timeout_secs = 3
"#;

/// Write the default config to `config_path` (or the global config path)
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    write_atomic(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
