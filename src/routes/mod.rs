#![allow(unused_imports)]
pub mod get_routes;
pub mod post_routes;
pub mod routes_utils;

use super::ODM;
use super::config;
use super::mailer;
use super::payments;

use rocket::serde::{ Serialize, Deserialize, json::{ Json, Error as JsonError } };
use rocket::http::{SameSite, CookieJar, Cookie};

use rocket::Route;
pub use routes_utils::*;
use rocket::http::Status;

use rocket::State;

use mongodb::Database;
use ODM::models::{User, Vehicle, Booking};

use log::{debug, error, info, trace, warn};

use get_routes::get_routes;
use post_routes::post_routes;

pub fn routes() -> Vec<Route> {
    let mut routes = get_routes();
    routes.append(&mut post_routes());
    routes
}
