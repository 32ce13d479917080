//!
//! #  VehiQuest - a vehicle-rental marketplace backend
//!
//! VehiQuest is the HTTP backend of a vehicle-rental marketplace, backed by
//! MongoDB.
//!
//! It issues authentication cookies, serves CRUD for vehicle listings and
//! role-gated admin/host views, and keeps a per-vehicle availability ledger:
//! booking requests are admitted against the vehicle's committed calendar
//! dates with a single atomic conditional update, so no two confirmed
//! bookings can ever share a date on the same vehicle. On top of that:
//!
//! * Simple sales statistics per admin / host / guest
//! * Payment-intent creation through Stripe
//! * Best-effort booking emails to guest and host
//!


#![allow(dead_code)]
#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(non_snake_case)]
#[macro_use] extern crate rocket;

mod routes;
mod ODM;
mod config;
mod mailer;
mod payments;

use routes::{MongoState, Config};
use log::{debug, error, info, trace, warn};

#[cfg(test)] mod tests;

/// The main functions, runs w/ cargo run
#[rocket::main]
async fn main() -> Result<(), ()> {
    let config = config::config::init().await;
    let config = match config {
        Err(e) => {
            println!("{}", format!("CONFIG failed to launch {}", e));
            return Ok(());
        },
        Ok(value) => value,
    };
    let _ = config::config::setup_logger(&config).await;
    let db = match ODM::odm::init(&config).await {
        Err(val) =>  {
            return Ok(());
        },
        Ok(value) => value,
    };
    warn!("VEHIQUEST IS LAUNCHING");

    let lift = rocket::build()
    .mount("/", routes::routes())
    .manage(MongoState { db })
    .manage(Config { config } )
    .launch()
    .await;

    warn!("VEHIQUEST OVER");
    match lift {
        Ok(value) => return Ok(()),
        Err(value) => {
            error!("Rocket could not run, error {}", value);
            return Ok(());
        }
    }
}
