use anyhow::Context;
use future_you_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing future-you in: {}", root.display());

    for dir in [paths::DATA_DIR, paths::DOCUMENTS_DIR, paths::LOCAL_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let data = serde_yaml::to_string(&Config::new())?;
    let written = io::write_if_missing(&paths::config_path(root), data.as_bytes())
        .context("failed to write config.yaml")?;
    if written {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    println!("\nSet GEMINI_API_KEY (or generation.api_key_env) before running `future-you serve`.");
    Ok(())
}
