#![forbid(unsafe_code)]

//! Page configuration loading.
//!
//! A page may override the built-in tuning with an inline JSON block:
//!
//! ```html
//! <script type="application/json" data-site-config>
//!   { "contact": { "service_id": "service_x" }, "log_level": "debug" }
//! </script>
//! ```
//!
//! A missing block means defaults. A block that fails to parse or validate
//! also means defaults; the problems are returned so they can be logged once
//! the console subscriber is up.

use folio_core::{SiteConfig, SiteError};

/// Selector of the inline configuration block.
pub const CONFIG_SELECTOR: &str = "script[data-site-config]";

/// Configuration in effect plus anything wrong with the page's block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub config: SiteConfig,
    pub problems: Vec<String>,
}

/// Resolve the configuration from the block's text content, if any.
#[must_use]
pub fn load(raw: Option<&str>) -> LoadedConfig {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return LoadedConfig::default();
    };
    match SiteConfig::from_json_str(raw).and_then(SiteConfig::into_validated) {
        Ok(config) => LoadedConfig {
            config,
            problems: Vec::new(),
        },
        Err(SiteError::Validation(problems)) => LoadedConfig {
            config: SiteConfig::default(),
            problems,
        },
        Err(err) => LoadedConfig {
            config: SiteConfig::default(),
            problems: vec![err.to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::config::LogLevel;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_or_blank_block_is_default() {
        assert_eq!(load(None), LoadedConfig::default());
        assert_eq!(load(Some("  \n ")), LoadedConfig::default());
    }

    #[test]
    fn valid_block_applies() {
        let loaded = load(Some(
            r#"{ "contact": { "service_id": "service_x" }, "log_level": "debug" }"#,
        ));
        assert!(loaded.problems.is_empty());
        assert_eq!(loaded.config.contact.service_id, "service_x");
        assert_eq!(loaded.config.log_level, LogLevel::Debug);
    }

    #[test]
    fn malformed_block_falls_back() {
        let loaded = load(Some("{ not json"));
        assert_eq!(loaded.config, SiteConfig::default());
        assert_eq!(loaded.problems.len(), 1);
        assert!(loaded.problems[0].starts_with("JSON error"));
    }

    #[test]
    fn invalid_values_fall_back_with_every_problem() {
        let loaded = load(Some(
            r#"{ "nav": { "settle_delay_ms": 0 }, "lazy": { "threshold": 2.0 } }"#,
        ));
        assert_eq!(loaded.config, SiteConfig::default());
        assert_eq!(loaded.problems.len(), 2);
    }
}
