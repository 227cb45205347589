//! Paging configuration.
//!
//! Deserialized from the `paging` section of a Figment configuration:
//!
//! ```yaml
//! paging:
//!   default_page_size: 20
//!   default_ascending: false
//!   max_page_size: 1000
//!   sort_fallback: true
//!   fallback_fields: ["Id", "DateCreated"]
//! ```
//!
//! [`PagingConfig::load_layered`] layers a YAML file under `APP__`-prefixed
//! environment variables, e.g. `APP__PAGING__MAX_PAGE_SIZE=500`.

use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::DEFAULT_PAGE_SIZE;
use crate::resolver::FallbackPolicy;

pub const CONFIG_KEY: &str = "paging";
pub const ENV_PREFIX: &str = "APP__";

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_fallback_fields() -> Vec<String> {
    vec!["Id".to_owned(), "DateCreated".to_owned()]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PagingConfig {
    /// Page size used when a request omits it.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Sort direction used when a request omits it.
    #[serde(default)]
    pub default_ascending: bool,
    /// Upper bound for `page_size`; larger requests are rejected.
    #[serde(default)]
    pub max_page_size: Option<u32>,
    /// Resolve unknown sort fields through `fallback_fields` instead of failing.
    #[serde(default)]
    pub sort_fallback: bool,
    #[serde(default = "default_fallback_fields")]
    pub fallback_fields: Vec<String>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            default_ascending: false,
            max_page_size: None,
            sort_fallback: false,
            fallback_fields: default_fallback_fields(),
        }
    }
}

impl PagingConfig {
    /// Extract the `paging` section; an absent section yields defaults.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        if !figment.contains(CONFIG_KEY) {
            return Ok(Self::default());
        }
        let cfg: PagingConfig = figment
            .extract_inner(CONFIG_KEY)
            .map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a YAML file (optional) overridden by environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let figment = Figment::new()
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(Error::Config("default_page_size must be at least 1".into()));
        }
        if let Some(max) = self.max_page_size {
            if max < self.default_page_size {
                return Err(Error::Config(format!(
                    "max_page_size ({max}) is smaller than default_page_size ({})",
                    self.default_page_size
                )));
            }
        }
        if self.sort_fallback && self.fallback_fields.is_empty() {
            return Err(Error::Config(
                "sort_fallback is enabled but fallback_fields is empty".into(),
            ));
        }
        Ok(())
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        if self.sort_fallback {
            FallbackPolicy::Fallback(self.fallback_fields.clone())
        } else {
            FallbackPolicy::Strict
        }
    }
}
