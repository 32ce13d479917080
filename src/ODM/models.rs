//!
//! Documentation of the Models module.
//! Contains all the models needed for a VehiQuest connection.
//!



use rocket::serde::{Serialize, Deserialize};
use bson::{oid::ObjectId, DateTime};

/*
Models for the MongoDB operations
*/

/// Account role, stored as a lowercase string in the users collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Host,
    Admin,
}

/// Listing lifecycle, stored as a lowercase string in the vehicles collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Pending,
    Active,
    SoldOut,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserDocument {
    /// The ID of the model.
    pub _id: Option<ObjectId>,
    /// The user's email address.
    pub email: String,
    /// The name of the user
    pub name: String,
    /// guest / host / admin
    pub role: Role,
    /// Account status ("Verified", "Requested", ...)
    pub status: String,
    /// Onboarding time, ms since epoch
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    /// The ID of the model.
    pub _id: String,
    /// The user's email address.
    pub email: String,
    // The name of the user
    pub name: String,
    // guest / host / admin
    pub role: Role,
    // Account status
    pub status: String,
    // Onboarding time, ms since epoch
    pub timestamp: i64,
}

/// Identity snapshot embedded in vehicles (the owning host) and bookings (the guest)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VehicleDocument {
    /// The ID of the model.
    pub _id: Option<ObjectId>,
    /// The internal ID
    pub vehicleID: String,
    /// Listing title
    pub title: String,
    /// Listing description
    pub description: String,
    /// Pickup location
    pub location: String,
    /// Listing image URL
    pub image: String,
    /// Price per day
    pub price: f64,
    /// Snapshot of the owning host
    pub host: Contact,
    /// Calendar dates already committed to confirmed bookings
    pub bookedDates: Vec<String>,
    /// Optional availability ceiling
    pub totalAvailableDays: Option<i64>,
    /// pending / active / sold_out / cancelled
    pub status: VehicleStatus,
    /// Derived flag, cleared only by an admin reset
    pub soldOut: bool,
    /// Soft-delete flag
    pub isDeleted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vehicle {
    //// The ID of the model.
    pub _id: String,
    /// The internal ID
    pub vehicleID: String,
    /// Listing title
    pub title: String,
    /// Listing description
    pub description: String,
    /// Pickup location
    pub location: String,
    /// Listing image URL
    pub image: String,
    /// Price per day
    pub price: f64,
    /// Snapshot of the owning host
    pub host: Contact,
    /// The committed-date ledger
    pub bookedDates: Vec<String>,
    /// Optional availability ceiling
    pub totalAvailableDays: Option<i64>,
    /// pending / active / sold_out / cancelled
    pub status: VehicleStatus,
    /// Derived flag
    pub soldOut: bool,
    /// Soft-delete flag
    pub isDeleted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingDocument {
    /// The ID of the model.
    pub _id: Option<ObjectId>,
    /// The booked vehicle's internal ID
    pub vehicleID: String,
    /// The reserved calendar dates
    pub dates: Vec<String>,
    /// The guest who booked
    pub guest: Contact,
    /// The host's email address
    pub host: String,
    /// Payment processor reference
    pub transactionId: String,
    /// Total price paid
    pub price: f64,
    /// Creation time
    pub createdAt: DateTime,
    /// confirmed / cancelled
    pub status: BookingStatus,
    /// Soft-delete flag
    pub isDeleted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    /// The ID of the model.
    pub _id: String,
    /// The booked vehicle's internal ID
    pub vehicleID: String,
    /// The reserved calendar dates
    pub dates: Vec<String>,
    /// The guest who booked
    pub guest: Contact,
    /// The host's email address
    pub host: String,
    /// Payment processor reference
    pub transactionId: String,
    /// Total price paid
    pub price: f64,
    /// Creation time
    pub createdAt: DateTime,
    /// confirmed / cancelled
    pub status: BookingStatus,
    /// Soft-delete flag
    pub isDeleted: bool,
}
