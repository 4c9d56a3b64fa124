//! Basic usage walkthrough for DealerDb
//!
//! This example demonstrates the fundamental operations:
//! - Opening a store
//! - Registering models and cars
//! - Selling a car and inspecting the joined view
//! - Renaming a VIN
//! - Reverting a sale
//! - Ranking the top-selling models

use chrono::NaiveDateTime;
use dealerdb::{Car, CarService, CarStatus, Model, Sale, DATE_FORMAT};
use rust_decimal::Decimal;
use std::str::FromStr;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Open store (directory will be created if it doesn't exist)
    let service = CarService::open("./dealer_data")?;
    println!("Store opened successfully");

    // Register a model and two cars
    println!("Registering model and cars...");
    service.register_model(Model {
        id: 1,
        name: "Model3".to_string(),
        brand: "Tesla".to_string(),
    })?;

    for (vin, price) in [("VIN1", "30000.00"), ("VIN2", "31000.00")] {
        service.register_car(Car {
            vin: vin.to_string(),
            model: 1,
            price: Decimal::from_str(price)?,
            date_start: NaiveDateTime::parse_from_str("2024-01-01 00:00:00", DATE_FORMAT)?,
            status: CarStatus::Available,
        })?;
    }

    let available = service.cars_by_status(CarStatus::Available)?;
    println!("{} cars available", available.len());

    // Sell one
    println!("Selling VIN1...");
    let sold = service.sell_car(Sale {
        sales_number: "S1".to_string(),
        car_vin: "VIN1".to_string(),
        cost: Decimal::from_str("29000.00")?,
        sales_date: NaiveDateTime::parse_from_str("2024-02-01 00:00:00", DATE_FORMAT)?,
    })?;
    println!("Sold: {} is now {}", sold.vin, sold.status);

    // Joined view
    if let Some(info) = service.full_car_info("VIN1")? {
        println!(
            "VIN1: {} {} listed at {}, sold for {:?}",
            info.car_model_brand, info.car_model_name, info.price, info.sales_cost
        );
    }

    // Rename the unsold car
    let renamed = service.rename_vin("VIN2", "VIN2-NEW")?;
    println!("Renamed to {}", renamed.vin);

    // Ranking
    for (i, stats) in service.top_models_by_sales(3)?.iter().enumerate() {
        println!(
            "#{} {} {} with {} sale(s)",
            i + 1,
            stats.brand,
            stats.car_model_name,
            stats.sales_number
        );
    }

    // Revert the sale
    let reverted = service.revert_sale("S1")?;
    println!("Reverted: {} is {} again", reverted.vin, reverted.status);

    Ok(())
}
