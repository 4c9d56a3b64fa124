//! Domain entities and their record codecs.
//!
//! Each entity converts to and from the ordered field list stored in
//! its data file. The conversions are pure and stateless; a parse
//! failure on stored data means the file is corrupt and is a hard
//! error, never a recoverable condition.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp format used for all stored dates (second precision).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sale lifecycle status of a car.
///
/// `Reserved` is a declared state that no storage operation currently
/// produces; it round-trips through the codec for callers that set it
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    /// On the lot and purchasable.
    Available,
    /// Held for a customer.
    Reserved,
    /// A live sale references this car.
    Sold,
}

impl CarStatus {
    /// The stored textual form.
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Reserved => "reserved",
            CarStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(CarStatus::Available),
            "reserved" => Ok(CarStatus::Reserved),
            "sold" => Ok(CarStatus::Sold),
            other => Err(Error::corruption(format!("unknown car status {:?}", other))),
        }
    }
}

/// A car model. Immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Primary key, externally assigned.
    pub id: i64,
    /// Model name.
    pub name: String,
    /// Manufacturer brand.
    pub brand: String,
}

impl Model {
    /// Ordered field list for storage: `(id, name, brand)`.
    pub fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.brand.clone()]
    }

    /// Rebuild a model from its stored fields.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() != 3 {
            return Err(Error::corruption(format!(
                "model record has {} fields, expected 3",
                fields.len()
            )));
        }
        Ok(Self {
            id: parse_field(&fields[0], "model id")?,
            name: fields[1].clone(),
            brand: fields[2].clone(),
        })
    }
}

/// A car on the lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Primary key; renameable via the dedicated operation.
    pub vin: String,
    /// Foreign key to [`Model::id`].
    pub model: i64,
    /// Listed price.
    pub price: Decimal,
    /// When the car went on sale.
    pub date_start: NaiveDateTime,
    /// Current lifecycle status.
    pub status: CarStatus,
}

impl Car {
    /// Index of the VIN field within the stored record.
    pub const VIN_FIELD: usize = 0;
    /// Index of the status field within the stored record.
    pub const STATUS_FIELD: usize = 4;

    /// Ordered field list for storage:
    /// `(vin, model, price, date_start, status)`.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.vin.clone(),
            self.model.to_string(),
            self.price.to_string(),
            self.date_start.format(DATE_FORMAT).to_string(),
            self.status.to_string(),
        ]
    }

    /// Rebuild a car from its stored fields.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() != 5 {
            return Err(Error::corruption(format!(
                "car record has {} fields, expected 5",
                fields.len()
            )));
        }
        Ok(Self {
            vin: fields[0].clone(),
            model: parse_field(&fields[1], "car model id")?,
            price: parse_decimal(&fields[2], "car price")?,
            date_start: parse_datetime(&fields[3], "car date_start")?,
            status: fields[4].parse()?,
        })
    }
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Primary key, externally assigned.
    pub sales_number: String,
    /// Foreign key to [`Car::vin`].
    pub car_vin: String,
    /// Price the car actually sold for.
    pub cost: Decimal,
    /// When the sale happened.
    pub sales_date: NaiveDateTime,
}

impl Sale {
    /// Composite index key: `"<sales_number>#<car_vin>"`.
    ///
    /// Supports lookup by either half via string splitting.
    pub fn index_key(&self) -> String {
        format!("{}#{}", self.sales_number, self.car_vin)
    }

    /// Ordered field list for storage:
    /// `(sales_number, car_vin, cost, sales_date)`.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.sales_number.clone(),
            self.car_vin.clone(),
            self.cost.to_string(),
            self.sales_date.format(DATE_FORMAT).to_string(),
        ]
    }

    /// Rebuild a sale from its stored fields.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() != 4 {
            return Err(Error::corruption(format!(
                "sale record has {} fields, expected 4",
                fields.len()
            )));
        }
        Ok(Self {
            sales_number: fields[0].clone(),
            car_vin: fields[1].clone(),
            cost: parse_decimal(&fields[2], "sale cost")?,
            sales_date: parse_datetime(&fields[3], "sale date")?,
        })
    }
}

/// Composite read-only view of a car joined with its model and, when
/// sold, its sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarFullInfo {
    /// The car's VIN.
    pub vin: String,
    /// Name of the car's model.
    pub car_model_name: String,
    /// Brand of the car's model.
    pub car_model_brand: String,
    /// Listed price.
    pub price: Decimal,
    /// When the car went on sale.
    pub date_start: NaiveDateTime,
    /// Current lifecycle status.
    pub status: CarStatus,
    /// Date of the live sale, if the car is sold.
    pub sales_date: Option<NaiveDateTime>,
    /// Cost of the live sale, if the car is sold.
    pub sales_cost: Option<Decimal>,
}

/// One row of the top-selling-models ranking.
///
/// The maximum observed sale cost participates in the ranking but is
/// not part of the reported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSaleStats {
    /// Name of the model.
    pub car_model_name: String,
    /// Brand of the model.
    pub brand: String,
    /// Number of live sales for the model.
    pub sales_number: u64,
}

fn parse_field<T: FromStr>(value: &str, what: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::corruption(format!("bad {} {:?}: {}", what, value, e)))
}

fn parse_decimal(value: &str, what: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| Error::corruption(format!("bad {} {:?}: {}", what, value, e)))
}

fn parse_datetime(value: &str, what: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::corruption(format!("bad {} {:?}: {}", what, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_car() -> Car {
        Car {
            vin: "VIN1".to_string(),
            model: 1,
            price: Decimal::new(3_000_000, 2), // 30000.00
            date_start: NaiveDateTime::parse_from_str("2024-01-01 00:00:00", DATE_FORMAT)
                .unwrap(),
            status: CarStatus::Available,
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [CarStatus::Available, CarStatus::Reserved, CarStatus::Sold] {
            assert_eq!(status.as_str().parse::<CarStatus>().unwrap(), status);
        }
        assert!("totaled".parse::<CarStatus>().is_err());
    }

    #[test]
    fn test_model_round_trip() {
        let model = Model {
            id: 1,
            name: "Model3".to_string(),
            brand: "Tesla".to_string(),
        };
        assert_eq!(Model::from_fields(&model.to_fields()).unwrap(), model);
    }

    #[test]
    fn test_car_round_trip() {
        let car = sample_car();
        let fields = car.to_fields();
        assert_eq!(fields[Car::VIN_FIELD], "VIN1");
        assert_eq!(fields[Car::STATUS_FIELD], "available");
        assert_eq!(Car::from_fields(&fields).unwrap(), car);
    }

    #[test]
    fn test_sale_round_trip_and_key() {
        let sale = Sale {
            sales_number: "S1".to_string(),
            car_vin: "VIN1".to_string(),
            cost: Decimal::new(2_900_000, 2),
            sales_date: NaiveDateTime::parse_from_str("2024-02-01 00:00:00", DATE_FORMAT)
                .unwrap(),
        };
        assert_eq!(sale.index_key(), "S1#VIN1");
        assert_eq!(Sale::from_fields(&sale.to_fields()).unwrap(), sale);
    }

    #[test]
    fn test_decimal_precision_survives() {
        let mut car = sample_car();
        car.price = Decimal::from_str("19999.99").unwrap();
        let restored = Car::from_fields(&car.to_fields()).unwrap();
        assert_eq!(restored.price, car.price);
        assert_eq!(restored.price.to_string(), "19999.99");
    }

    #[test]
    fn test_malformed_fields_are_corruption() {
        let mut fields = sample_car().to_fields();
        fields[2] = "not-a-price".to_string();
        assert!(matches!(Car::from_fields(&fields), Err(Error::Corruption(_))));

        let short = vec!["only".to_string(), "two".to_string()];
        assert!(Car::from_fields(&short).is_err());
        assert!(Model::from_fields(&short).is_err());
        assert!(Sale::from_fields(&short).is_err());
    }
}
