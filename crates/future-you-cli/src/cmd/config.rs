use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use future_you_core::config::Config;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        print_json(&config)
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
        Ok(())
    }
}

#[derive(Debug, serde::Serialize)]
struct Finding {
    level: &'static str,
    message: String,
}

fn check(config: &Config) -> Vec<Finding> {
    let mut findings = Vec::new();
    let g = &config.generation;
    if g.api_key().is_none() {
        findings.push(Finding {
            level: "warning",
            message: format!(
                "{} is not set; letters and prompts will use fallback text",
                g.api_key_env
            ),
        });
    }
    if g.timeout_secs == 0 {
        findings.push(Finding {
            level: "error",
            message: "generation.timeout_secs must be greater than 0".into(),
        });
    }
    if !(0.0..=2.0).contains(&g.letter_temperature) {
        findings.push(Finding {
            level: "error",
            message: format!(
                "generation.letter_temperature {} is outside 0.0..=2.0",
                g.letter_temperature
            ),
        });
    }
    if g.model.trim().is_empty() {
        findings.push(Finding {
            level: "error",
            message: "generation.model is empty".into(),
        });
    }
    if config.auth.min_password_len == 0 {
        findings.push(Finding {
            level: "error",
            message: "auth.min_password_len must be at least 1".into(),
        });
    }
    if config.auth.session_ttl_secs == 0 {
        findings.push(Finding {
            level: "error",
            message: "auth.session_ttl_secs must be greater than 0".into(),
        });
    }
    if config.auth.max_failed_attempts == 0 {
        findings.push(Finding {
            level: "error",
            message: "auth.max_failed_attempts must be at least 1".into(),
        });
    }
    findings
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let findings = check(&config);
    let errors = findings.iter().filter(|f| f.level == "error").count();

    if json {
        print_json(&serde_json::json!({ "ok": errors == 0, "findings": findings }))?;
    } else if findings.is_empty() {
        println!("config ok");
    } else {
        for f in &findings {
            println!("{}: {}", f.level, f.message);
        }
    }

    if errors > 0 {
        anyhow::bail!("config has {errors} error(s)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_errors() {
        let findings = check(&Config::new());
        assert!(findings.iter().all(|f| f.level != "error"));
    }

    #[test]
    fn zero_timeout_and_bad_temperature_are_errors() {
        let mut c = Config::new();
        c.generation.timeout_secs = 0;
        c.generation.letter_temperature = 3.5;
        let errors: Vec<_> = check(&c).into_iter().filter(|f| f.level == "error").collect();
        assert_eq!(errors.len(), 2);
    }
}
