//! Locator-wide tunables: a `serde`-deserializable struct with
//! defaults, optionally overlaid from a config file and environment
//! variables via the `config` crate.

use serde::{Deserialize, Serialize};

/// Tunables for the fetch/force/index engines and the classname
/// registry they share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Page size in bytes, used as the copy-area grow-and-retry unit and
    /// to derive `BTREE_MAX_KEYLEN_INPAGE` (`page_size / 8`).
    pub page_size: usize,
    /// Soft cap on cached-`EXIST` classname entries kept in the
    /// transient table.
    pub classname_soft_cap: usize,
    /// Fraction of cached-`EXIST` entries evicted per attempt once the
    /// soft cap is exceeded.
    pub classname_eviction_fraction: f64,
    /// Whether `FLUSH_INSERT`/`FLUSH_UPDATE` run the foreign-key
    /// presence check. Sessions may disable this (e.g. a replication
    /// applier trusts the upstream already enforced it).
    pub fk_checks_enabled: bool,
    /// Default neighbor-prefetch depth for `fetch` when the caller
    /// doesn't specify one.
    pub prefetch_depth_default: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            page_size: 16 * 1024,
            classname_soft_cap: 1024,
            classname_eviction_fraction: 0.10,
            fk_checks_enabled: true,
            prefetch_depth_default: 1,
        }
    }
}

impl LocatorConfig {
    /// Load configuration layered from compiled-in defaults, overlaid
    /// by an optional file at `path`, overlaid by `LOCATOR_*`
    /// environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("page_size", defaults.page_size as i64)?
            .set_default("classname_soft_cap", defaults.classname_soft_cap as i64)?
            .set_default(
                "classname_eviction_fraction",
                defaults.classname_eviction_fraction,
            )?
            .set_default("fk_checks_enabled", defaults.fk_checks_enabled)?
            .set_default(
                "prefetch_depth_default",
                defaults.prefetch_depth_default as i64,
            )?;
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("LOCATOR"));
        builder.build()?.try_deserialize()
    }

    /// `BTREE_MAX_KEYLEN_INPAGE`: the inline-key length threshold above
    /// which a key is stored in the overflow file.
    pub fn max_inline_key_len(&self) -> usize {
        locator_btree::max_inline_key_len(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_registry_defaults() {
        let cfg = LocatorConfig::default();
        assert_eq!(cfg.classname_soft_cap, 1024);
        assert_eq!(cfg.classname_eviction_fraction, 0.10);
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let cfg = LocatorConfig::load(None).unwrap();
        assert_eq!(cfg, LocatorConfig::default());
    }

    #[test]
    fn max_inline_key_len_is_page_size_over_eight() {
        let cfg = LocatorConfig {
            page_size: 8192,
            ..LocatorConfig::default()
        };
        assert_eq!(cfg.max_inline_key_len(), 1024);
    }
}
