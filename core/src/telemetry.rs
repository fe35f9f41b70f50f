use prometheus::{IntCounter, Registry};

/// Tellere for cache- og innlastingsadferd. Én instans per repository,
/// ingen global state.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub cache_hit_total: IntCounter,
    pub cache_miss_total: IntCounter,
    pub cache_reload_total: IntCounter,
    pub rows_skipped_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let cache_hit_total =
            IntCounter::new("cache_hit_total", "Cache-treff (mtime uendret)")
                .expect("gyldig counter-navn");
        let cache_miss_total =
            IntCounter::new("cache_miss_total", "Cache-bom (første innlasting)")
                .expect("gyldig counter-navn");
        let cache_reload_total =
            IntCounter::new("cache_reload_total", "Reinnlasting pga. endret mtime")
                .expect("gyldig counter-navn");
        let rows_skipped_total =
            IntCounter::new("rows_skipped_total", "CSV-rader hoppet over (mangler id/dato)")
                .expect("gyldig counter-navn");

        for c in [
            &cache_hit_total,
            &cache_miss_total,
            &cache_reload_total,
            &rows_skipped_total,
        ] {
            registry
                .register(Box::new(c.clone()))
                .expect("unike counter-navn i eget registry");
        }

        Self {
            registry,
            cache_hit_total,
            cache_miss_total,
            cache_reload_total,
            rows_skipped_total,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

pub fn cache_hit_total(metrics: &Metrics) -> &IntCounter {
    &metrics.cache_hit_total
}

pub fn cache_miss_total(metrics: &Metrics) -> &IntCounter {
    &metrics.cache_miss_total
}

pub fn cache_reload_total(metrics: &Metrics) -> &IntCounter {
    &metrics.cache_reload_total
}
