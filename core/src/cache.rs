//! mtime-nøklet cache rundt en fil-laster.
//!
//! Invalidering skjer kun når filens modifikasjonstid endrer seg – ikke ved
//! innholdshash. To skriv innenfor filsystemets tidsoppløsning kan dermed gå
//! upåaktet hen; det er en akseptert og dokumentert begrensning, ikke noe
//! denne cachen forsøker å fikse.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::errors::ViewerError;
use crate::telemetry::Metrics;

/// Memoiserer resultatet av én fil-innlasting, nøklet på mtime.
/// Verdien deles ut som `Arc<T>` slik at kallere slipper å klone radvektorer.
#[derive(Debug, Default)]
pub struct FileCache<T> {
    entry: Mutex<Option<(SystemTime, Arc<T>)>>,
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }

    /// Returnér cachet verdi hvis mtime er uendret, ellers last på nytt.
    pub fn get_or_load<F>(
        &self,
        path: &Path,
        metrics: &Metrics,
        loader: F,
    ) -> Result<Arc<T>, ViewerError>
    where
        F: FnOnce(&Path) -> Result<T, ViewerError>,
    {
        let mtime = std::fs::metadata(path)?.modified()?;
        let mut entry = self.entry.lock().unwrap();

        match entry.as_ref() {
            Some((stamp, value)) if *stamp == mtime => {
                metrics.cache_hit_total.inc();
                Ok(Arc::clone(value))
            }
            Some(_) => {
                metrics.cache_reload_total.inc();
                let value = Arc::new(loader(path)?);
                *entry = Some((mtime, Arc::clone(&value)));
                Ok(value)
            }
            None => {
                metrics.cache_miss_total.inc();
                let value = Arc::new(loader(path)?);
                *entry = Some((mtime, Arc::clone(&value)));
                Ok(value)
            }
        }
    }

    /// Glem cachet verdi; neste `get_or_load` laster uansett.
    pub fn invalidate(&self) {
        *self.entry.lock().unwrap() = None;
    }
}
