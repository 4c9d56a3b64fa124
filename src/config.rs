//! Configuration for the dealership record store.
//!
//! All six backing files live directly under a single root directory:
//!
//! ```text
//! {root_dir}/
//!   ├── cars.txt            (fixed-width car records)
//!   ├── cars_index.txt      (vin -> line number, sorted)
//!   ├── models.txt          (fixed-width model records)
//!   ├── models_index.txt    (model id -> line number, sorted)
//!   ├── sales.txt           (fixed-width sale records)
//!   └── sales_index.txt     (sales_number#vin -> line number, sorted)
//! ```

use std::path::{Path, PathBuf};

/// Resolved file paths for one store instance.
///
/// Built once from the root directory and passed into the service;
/// there is no process-wide path state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for all data and index files.
    root_dir: PathBuf,

    cars: PathBuf,
    cars_index: PathBuf,
    models: PathBuf,
    models_index: PathBuf,
    sales: PathBuf,
    sales_index: PathBuf,
}

impl Config {
    /// Resolve the six file paths under `root_dir`.
    ///
    /// The directory itself is not created here; files are created
    /// lazily on first write.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        Self {
            cars: root_dir.join("cars.txt"),
            cars_index: root_dir.join("cars_index.txt"),
            models: root_dir.join("models.txt"),
            models_index: root_dir.join("models_index.txt"),
            sales: root_dir.join("sales.txt"),
            sales_index: root_dir.join("sales_index.txt"),
            root_dir,
        }
    }

    /// Root directory for all backing files.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path to the car data file.
    pub fn cars(&self) -> &Path {
        &self.cars
    }

    /// Path to the car index file.
    pub fn cars_index(&self) -> &Path {
        &self.cars_index
    }

    /// Path to the model data file.
    pub fn models(&self) -> &Path {
        &self.models
    }

    /// Path to the model index file.
    pub fn models_index(&self) -> &Path {
        &self.models_index
    }

    /// Path to the sales data file.
    pub fn sales(&self) -> &Path {
        &self.sales
    }

    /// Path to the sales index file.
    pub fn sales_index(&self) -> &Path {
        &self.sales_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolved_under_root() {
        let config = Config::new("/tmp/dealer");
        assert_eq!(config.cars(), Path::new("/tmp/dealer/cars.txt"));
        assert_eq!(config.sales_index(), Path::new("/tmp/dealer/sales_index.txt"));
        assert_eq!(config.root_dir(), Path::new("/tmp/dealer"));
    }
}
