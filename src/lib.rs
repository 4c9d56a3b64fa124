//! # DealerDb - A Flat-File Dealership Record Store
//!
//! DealerDb is a minimal persistent record store for a vehicle-dealership
//! domain (cars, models, sales) built directly on flat files, with no
//! external database engine.
//!
//! ## Architecture
//!
//! The store consists of a few layered components:
//!
//! - **Record codec**: fixed-width textual encoding of field tuples
//! - **Data files**: append-only, addressable by zero-based line number
//! - **Index files**: sorted `key;line_number` companions per data file
//! - **Entity codecs**: typed Car/Model/Sale conversions
//! - **CarService**: the domain operations composed from the above
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 CarService                   │
//! │   register / sell / rename / revert / query  │
//! └──────────┬─────────────────────┬─────────────┘
//!            │                     │
//!            ▼                     ▼
//!     ┌─────────────┐       ┌─────────────┐
//!     │  DataFile   │       │  IndexFile  │
//!     │ (fixed-width│       │ (sorted     │
//!     │  slots)     │       │  key->line) │
//!     └──────┬──────┘       └──────┬──────┘
//!            │                     │
//!            └────────┬────────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │ Record codec│
//!              └─────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dealerdb::{Car, CarService, CarStatus, Model};
//! use chrono::NaiveDateTime;
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! # fn main() -> Result<(), dealerdb::Error> {
//! let service = CarService::open("./dealer_data")?;
//!
//! service.register_model(Model {
//!     id: 1,
//!     name: "Model3".to_string(),
//!     brand: "Tesla".to_string(),
//! })?;
//!
//! service.register_car(Car {
//!     vin: "VIN1".to_string(),
//!     model: 1,
//!     price: Decimal::from_str("30000.00").unwrap(),
//!     date_start: NaiveDateTime::parse_from_str(
//!         "2024-01-01 00:00:00",
//!         dealerdb::DATE_FORMAT,
//!     ).unwrap(),
//!     status: CarStatus::Available,
//! })?;
//!
//! let available = service.cars_by_status(CarStatus::Available)?;
//! println!("{} cars available", available.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! The store is single-threaded and synchronous. Every operation opens,
//! works on, and closes its files within the call; index mutations are
//! whole-file read-modify-write cycles with no locking, so the design
//! assumes a single exclusive actor per root directory.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod datafile;
pub mod domain;
pub mod error;
pub mod index;
pub mod record;

// Re-exports
pub use config::Config;
pub use domain::{Car, CarFullInfo, CarStatus, Model, ModelSaleStats, Sale, DATE_FORMAT};
pub use error::{Error, Result};

use datafile::DataFile;
use index::{IndexEntry, IndexFile};
use rust_decimal::Decimal;

/// The main service handle.
///
/// Composes the data and index files under one root directory into the
/// dealership operations. Construction is cheap: no file is opened
/// until an operation touches it.
pub struct CarService {
    cars: DataFile,
    cars_index: IndexFile,
    models: DataFile,
    models_index: IndexFile,
    sales: DataFile,
    sales_index: IndexFile,
}

impl CarService {
    /// Build a service over already-resolved paths.
    pub fn new(config: Config) -> Self {
        Self {
            cars: DataFile::new(config.cars()),
            cars_index: IndexFile::new(config.cars_index()),
            models: DataFile::new(config.models()),
            models_index: IndexFile::new(config.models_index()),
            sales: DataFile::new(config.sales()),
            sales_index: IndexFile::new(config.sales_index()),
        }
    }

    /// Open a store rooted at `root_dir`, creating the directory if it
    /// does not exist.
    pub fn open(root_dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        let config = Config::new(root_dir);
        std::fs::create_dir_all(config.root_dir())?;
        log::info!("opened dealership store at {:?}", config.root_dir());
        Ok(Self::new(config))
    }

    /// Register a new model: append to the model data file and insert
    /// its id into the model index.
    ///
    /// No uniqueness check is performed; registering the same id twice
    /// produces two data rows and two index entries, and lookups will
    /// return the first match.
    pub fn register_model(&self, model: Model) -> Result<Model> {
        let line = self.models.append(&model.to_fields())?;
        self.models_index.insert_sorted(&model.id.to_string(), line)?;
        log::debug!("registered model {} at line {}", model.id, line);
        Ok(model)
    }

    /// Register a new car: append to the car data file and insert its
    /// VIN into the car index.
    ///
    /// As with models, duplicate VINs are not rejected.
    pub fn register_car(&self, car: Car) -> Result<Car> {
        let line = self.cars.append(&car.to_fields())?;
        self.cars_index.insert_sorted(&car.vin, line)?;
        log::debug!("registered car {} at line {}", car.vin, line);
        Ok(car)
    }

    /// Record a sale and mark the referenced car as sold.
    ///
    /// The sale is persisted first; if the car then turns out not to
    /// exist the operation fails with [`Error::CarNotFound`] and the
    /// already-appended sale record stays on disk. There is no
    /// compensating rollback.
    pub fn sell_car(&self, sale: Sale) -> Result<Car> {
        let line = self.sales.append(&sale.to_fields())?;
        self.sales_index.insert_sorted(&sale.index_key(), line)?;

        let car_line = self
            .cars_index
            .find(&sale.car_vin)?
            .ok_or_else(|| Error::CarNotFound(sale.car_vin.clone()))?;

        let fields =
            self.cars
                .overwrite_field(car_line, Car::STATUS_FIELD, CarStatus::Sold.as_str())?;
        log::info!("sold car {} (sale {})", sale.car_vin, sale.sales_number);
        Car::from_fields(&fields)
    }

    /// List every car with the given status, in on-disk append order.
    ///
    /// Callers must not assume any particular ordering beyond that.
    /// A missing car data file yields an empty list.
    pub fn cars_by_status(&self, status: CarStatus) -> Result<Vec<Car>> {
        let mut result = Vec::new();
        for item in self.cars.scan()? {
            let (_, fields) = item?;
            if fields.get(Car::STATUS_FIELD).map(String::as_str) == Some(status.as_str()) {
                result.push(Car::from_fields(&fields)?);
            }
        }
        Ok(result)
    }

    /// Full joined view of one car: model name and brand, plus sale
    /// cost and date when the car is sold.
    ///
    /// Returns `Ok(None)` when the VIN is absent, and likewise when a
    /// referenced model or sale row is unexpectedly missing (a
    /// tolerated data-integrity gap on this read path).
    pub fn full_car_info(&self, vin: &str) -> Result<Option<CarFullInfo>> {
        let car_line = match self.cars_index.find(vin)? {
            Some(n) => n,
            None => return Ok(None),
        };
        let car_fields = match self.cars.read_line(car_line)? {
            Some(f) => f,
            None => return Ok(None),
        };
        let car = Car::from_fields(&car_fields)?;

        let model_line = match self.models_index.find(&car.model.to_string())? {
            Some(n) => n,
            None => return Ok(None),
        };
        let model_fields = match self.models.read_line(model_line)? {
            Some(f) => f,
            None => return Ok(None),
        };
        let model = Model::from_fields(&model_fields)?;

        let mut sales_date = None;
        let mut sales_cost = None;
        if car.status == CarStatus::Sold {
            let sale_line = match self.sales_index.find_by_vin(vin)? {
                Some(n) => n,
                None => return Ok(None),
            };
            let sale_fields = match self.sales.read_line(sale_line)? {
                Some(f) => f,
                None => return Ok(None),
            };
            let sale = Sale::from_fields(&sale_fields)?;
            sales_date = Some(sale.sales_date);
            sales_cost = Some(sale.cost);
        }

        Ok(Some(CarFullInfo {
            vin: car.vin,
            car_model_name: model.name,
            car_model_brand: model.brand,
            price: car.price,
            date_start: car.date_start,
            status: car.status,
            sales_date,
            sales_cost,
        }))
    }

    /// Change a car's VIN, migrating its index entry.
    ///
    /// The data row is rewritten in place (its line number never
    /// changes); the car index is then reloaded, every entry keyed by
    /// the old VIN is rewritten to the new one, and the file is
    /// re-sorted and rewritten in full.
    pub fn rename_vin(&self, vin: &str, new_vin: &str) -> Result<Car> {
        let car_line = self
            .cars_index
            .find(vin)?
            .ok_or_else(|| Error::CarNotFound(vin.to_string()))?;

        let fields = self.cars.overwrite_field(car_line, Car::VIN_FIELD, new_vin)?;

        let mut entries = self.cars_index.load_all()?;
        for entry in entries.iter_mut() {
            if entry.key == vin {
                entry.key = new_vin.to_string();
            }
        }
        self.cars_index.rewrite_all(entries)?;

        log::info!("renamed car {} -> {}", vin, new_vin);
        Car::from_fields(&fields)
    }

    /// Delete a sale and restore the car to `available`.
    ///
    /// The sale's index entry is removed and its data slot tombstoned;
    /// the slot stays occupied forever. Unlike the read paths, a
    /// missing car index entry here is a hard [`Error::CarNotFound`].
    pub fn revert_sale(&self, sales_number: &str) -> Result<Car> {
        let sale_line = self
            .sales_index
            .find_by_sales_number(sales_number)?
            .ok_or_else(|| Error::SaleNotFound(sales_number.to_string()))?;

        let entries = self.sales_index.load_all()?;
        let mut kept: Vec<IndexEntry> = Vec::with_capacity(entries.len());
        let mut vin = None;
        for entry in entries {
            match entry.key.split_once(index::COMPOSITE_SEPARATOR) {
                Some((number, entry_vin)) if number == sales_number => {
                    if vin.is_none() {
                        vin = Some(entry_vin.to_string());
                    }
                }
                _ => kept.push(entry),
            }
        }
        let vin = vin.ok_or_else(|| Error::SaleNotFound(sales_number.to_string()))?;

        self.sales_index.rewrite_all(kept)?;
        self.sales.mark_tombstone(sale_line)?;

        let car_line = self
            .cars_index
            .find(&vin)?
            .ok_or_else(|| Error::CarNotFound(vin.clone()))?;
        let fields = self.cars.overwrite_field(
            car_line,
            Car::STATUS_FIELD,
            CarStatus::Available.as_str(),
        )?;

        log::info!("reverted sale {} for car {}", sales_number, vin);
        Car::from_fields(&fields)
    }

    /// Rank models by live sales.
    ///
    /// Scans the sales data file (skipping tombstones), resolves each
    /// sale back to its model, and aggregates per model a sale count
    /// and the maximum observed sale cost. The ranking is ordered by
    /// `(count, max cost)` descending; ties keep first-encounter order
    /// (the sort is stable). At most `limit` rows are returned; the max
    /// cost ranks but is not reported.
    pub fn top_models_by_sales(&self, limit: usize) -> Result<Vec<ModelSaleStats>> {
        // (model line number, sale count, max sale cost), in
        // first-encounter order.
        let mut stats: Vec<(u64, u64, Decimal)> = Vec::new();

        for item in self.sales.scan()? {
            let (_, sale_fields) = item?;
            let sale = Sale::from_fields(&sale_fields)?;

            let car_line = self
                .cars_index
                .find(&sale.car_vin)?
                .ok_or_else(|| Error::CarNotFound(sale.car_vin.clone()))?;
            let car_fields = self.cars.read_line(car_line)?.ok_or_else(|| {
                Error::corruption(format!("car row {} missing for {}", car_line, sale.car_vin))
            })?;
            let car = Car::from_fields(&car_fields)?;

            let model_line = self
                .models_index
                .find(&car.model.to_string())?
                .ok_or_else(|| {
                    Error::corruption(format!("model {} not indexed", car.model))
                })?;

            match stats.iter().position(|(line, _, _)| *line == model_line) {
                Some(i) => {
                    stats[i].1 += 1;
                    if sale.cost > stats[i].2 {
                        stats[i].2 = sale.cost;
                    }
                }
                None => stats.push((model_line, 1, sale.cost)),
            }
        }

        // Stable sort: tied models keep their first-encounter order.
        stats.sort_by(|a, b| (b.1, b.2).cmp(&(a.1, a.2)));

        let mut result = Vec::new();
        for (model_line, count, _) in stats.into_iter().take(limit) {
            let model_fields = self.models.read_line(model_line)?.ok_or_else(|| {
                Error::corruption(format!("model row {} missing", model_line))
            })?;
            let model = Model::from_fields(&model_fields)?;
            result.push(ModelSaleStats {
                car_model_name: model.name,
                brand: model.brand,
                sales_number: count,
            });
        }
        Ok(result)
    }
}
