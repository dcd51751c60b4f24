use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use shared::config::ClientConfig;

/// Render the default configuration in `format` (`toml`, `yaml` or `json`).
pub fn render_default_config(format: &str) -> Result<String> {
    let config = ClientConfig::with_defaults();
    let rendered = match format {
        "toml" => toml::to_string_pretty(&config)?,
        "yaml" | "yml" => serde_yml::to_string(&config)?,
        "json" => serde_json::to_string_pretty(&config)?,
        other => bail!("unsupported format `{other}`; use toml, yaml or json"),
    };
    Ok(rendered)
}

/// Write the default configuration to `output`, or stdout when absent.
pub fn generate_config(format: &str, output: Option<&Path>) -> Result<()> {
    let rendered = render_default_config(format)?;
    match output {
        Some(path) => {
            fs::write(path, rendered.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Configuration file '{}' generated successfully.", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_configs_parse_back() {
        let toml_text = render_default_config("toml").expect("toml");
        let parsed: ClientConfig = toml::from_str(&toml_text).expect("parse toml");
        assert_eq!(parsed, ClientConfig::with_defaults());

        let json_text = render_default_config("json").expect("json");
        let parsed: ClientConfig = serde_json::from_str(&json_text).expect("parse json");
        assert_eq!(parsed, ClientConfig::with_defaults());
    }

    #[test]
    fn test_unknown_format() {
        let err = render_default_config("ini").expect_err("unsupported");
        assert!(err.to_string().contains("unsupported format"));
    }
}
