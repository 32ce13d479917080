//!
//! Documentation of the ledger module.
//! Booking admission control against a vehicle's committed-date calendar.
//!
//! A vehicle's `bookedDates` array is the availability ledger: every date in
//! it belongs to exactly one confirmed booking. Admission reserves the
//! requested dates with a single conditional update, so two overlapping
//! requests can never both pass the conflict check.
//!



use super::*;
use models::*;
use odm_utils::doc_to_vehicle;

use bson::{doc, DateTime};
use chrono::NaiveDate;
use mongodb::Database;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use rocket::serde::{Serialize, Deserialize};
use thiserror::Error;
use log::{error, info, warn};

/// Committed-date count beyond which a vehicle is automatically marked sold out
pub const SOLD_OUT_THRESHOLD: usize = 60;

// Reservation attempts before giving up on a contended vehicle
const ADMIT_ATTEMPTS: u32 = 3;

/// Why an admission request was turned away
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("vehicle {0} not found")]
    NotFound(String),
    #[error("some dates are already booked")]
    DatesTaken(Vec<String>),
    #[error("vehicle {0} is not open for booking")]
    SoldOut(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("database failure: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("could not settle the booking, try again")]
    Contended,
}

/// The admission request body, as posted to /bookings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingRequest {
    /// The vehicle to reserve
    pub vehicleID: String,
    /// Requested calendar dates, YYYY-MM-DD
    pub dates: Vec<String>,
    /// The guest's contact identity
    pub guest: Contact,
    /// The host's email address
    pub host: String,
    /// Payment processor reference
    pub transactionId: String,
    /// Total price paid
    pub price: f64,
}

/// What a successful admission hands back
#[derive(Debug, Serialize, Clone)]
pub struct AdmissionReceipt {
    pub bookingId: String,
    pub committedDates: usize,
    pub soldOut: bool,
}

///
/// Validates an admission request before any database access.
///
/// # Output
///
/// * Err(InvalidRequest) - empty / malformed date list or a missing identity field
/// * Ok(dates) - the requested dates with in-request duplicates collapsed
///
pub fn validate_request(request: &BookingRequest) -> Result<Vec<String>, AdmissionError> {
    if request.guest.email.trim().is_empty() || request.guest.name.trim().is_empty() {
        return Err(AdmissionError::InvalidRequest(
            "booking is missing the guest identity".to_string(),
        ));
    }
    if request.host.trim().is_empty() {
        return Err(AdmissionError::InvalidRequest(
            "booking is missing the host identity".to_string(),
        ));
    }
    if request.transactionId.trim().is_empty() {
        return Err(AdmissionError::InvalidRequest(
            "booking is missing the transaction reference".to_string(),
        ));
    }

    normalized_dates(&request.dates)
}

/// Parses and dedupes the requested dates, keeping the request order
fn normalized_dates(requested: &[String]) -> Result<Vec<String>, AdmissionError> {
    if requested.is_empty() {
        return Err(AdmissionError::InvalidRequest(
            "at least one date must be requested".to_string(),
        ));
    }

    let mut dates: Vec<String> = vec![];
    for date in requested {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(AdmissionError::InvalidRequest(format!(
                "'{}' is not a YYYY-MM-DD calendar date",
                date
            )));
        }
        if !dates.contains(date) {
            dates.push(date.clone());
        }
    }
    Ok(dates)
}

/// The requested dates that are already committed on the vehicle
pub fn conflicting_dates(requested: &[String], booked: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|date| booked.contains(date))
        .cloned()
        .collect()
}

/// Whether a committed-date count puts the vehicle past its availability
fn breaches_threshold(committed: usize, total_available: Option<i64>) -> bool {
    if committed > SOLD_OUT_THRESHOLD {
        return true;
    }
    match total_available {
        Some(total) => committed as i64 >= total,
        None => false,
    }
}

///
/// Admits or rejects a booking request.
///
/// The reservation is one conditional update: "add these dates only if the
/// vehicle is bookable and none of them are present". Concurrent requests
/// with overlapping dates serialize on that document write, so the ledger
/// can never hold the same date twice.
///
/// A rejected request leaves both collections untouched. If the booking
/// insert fails after the dates were reserved, the reserved dates are pulled
/// back out before the error is surfaced.
///
/// # Arguments
///
/// * `database` - Refrence to a database object
/// * `request` - the validated-on-entry booking payload
///
pub async fn admit_booking(
    db: &Database,
    request: &BookingRequest,
) -> Result<AdmissionReceipt, AdmissionError> {
    let dates = validate_request(request)?;

    let collection = db.collection::<VehicleDocument>("vehicles");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    for attempt in 0..ADMIT_ATTEMPTS {
        let reserved = collection
            .find_one_and_update(
                doc! {
                    "vehicleID":   &request.vehicleID,
                    "isDeleted":   false,
                    "soldOut":     false,
                    "status":      doc! { "$ne": "cancelled" },
                    "bookedDates": doc! { "$nin": dates.clone() },
                },
                doc! {"$addToSet": doc! { "bookedDates": doc! { "$each": dates.clone() } } },
                find_one_and_update_options.clone(),
            )
            .await?;

        let vehicle = match reserved {
            Some(value) => doc_to_vehicle(&value),
            None => {
                // No match: work out which precondition failed. A clean
                // diagnosis means a concurrent attempt was compensated
                // between our write and our read, so reserve again.
                diagnose_rejection(&db, &request.vehicleID, &dates).await?;
                warn!("{}", format!("Ledger:\tadmission retry {} for {}", attempt + 1, &request.vehicleID));
                continue;
            }
        };

        return commit_booking(&db, request, &dates, &vehicle).await;
    }

    Err(AdmissionError::Contended)
}

///
/// Reads the vehicle to name the rejection cause.
///
/// # Output
///
/// * Err(NotFound / SoldOut / DatesTaken) - the cause
/// * Ok(()) - no cause found, the reservation should be retried
///
async fn diagnose_rejection(
    db: &Database,
    vehicle_id: &str,
    dates: &[String],
) -> Result<(), AdmissionError> {
    let vehicle = odm::get_vehicle(&db, vehicle_id.to_string()).await?;

    let vehicle = match vehicle {
        Some(value) => value,
        None => return Err(AdmissionError::NotFound(vehicle_id.to_string())),
    };
    if vehicle.isDeleted {
        return Err(AdmissionError::NotFound(vehicle_id.to_string()));
    }
    if vehicle.soldOut || vehicle.status == VehicleStatus::Cancelled {
        return Err(AdmissionError::SoldOut(vehicle_id.to_string()));
    }

    let clash = conflicting_dates(dates, &vehicle.bookedDates);
    if !clash.is_empty() {
        return Err(AdmissionError::DatesTaken(clash));
    }

    Ok(())
}

/// Records the booking behind a successful reservation and re-evaluates the
/// sold-out threshold on the post-write ledger.
async fn commit_booking(
    db: &Database,
    request: &BookingRequest,
    dates: &[String],
    vehicle: &Vehicle,
) -> Result<AdmissionReceipt, AdmissionError> {
    let collection = db.collection::<BookingDocument>("bookings");

    let insert_doc = BookingDocument {
        _id: None,
        vehicleID: request.vehicleID.clone(),
        dates: dates.to_vec(),
        guest: request.guest.clone(),
        host: request.host.clone(),
        transactionId: request.transactionId.clone(),
        price: request.price,
        createdAt: DateTime::now(),
        status: BookingStatus::Confirmed,
        isDeleted: false,
    };

    let inserted = match collection.insert_one(&insert_doc, None).await {
        Ok(value) => value,
        Err(value) => {
            // The dates were reserved but the booking is gone: undo the
            // reservation so the ledger matches the booking collection.
            release_dates(&db, &request.vehicleID, dates).await;
            return Err(AdmissionError::Database(value));
        }
    };

    let booking_id = match inserted.inserted_id.as_object_id() {
        Some(value) => value.to_hex(),
        None => inserted.inserted_id.to_string(),
    };

    let committed = vehicle.bookedDates.len();
    let mut sold_out = vehicle.soldOut;
    if breaches_threshold(committed, vehicle.totalAvailableDays) {
        match mark_sold_out(&db, &request.vehicleID).await {
            Ok(_) => sold_out = true,
            // The booking stands either way; the flag catches up on the
            // next admission attempt's diagnosis.
            Err(value) => error!("{}", format!("Ledger:\tcould not mark {} sold out: {}", &request.vehicleID, value)),
        }
    }

    info!("{}", format!("Ledger:\tadmitted booking {} on {} ({} dates committed)", &booking_id, &request.vehicleID, committed));

    Ok(AdmissionReceipt {
        bookingId: booking_id,
        committedDates: committed,
        soldOut: sold_out,
    })
}

/// One-directional transition to sold_out (only the admin reset reverses it)
async fn mark_sold_out(db: &Database, vehicle_id: &str) -> mongodb::error::Result<()> {
    let collection = db.collection::<VehicleDocument>("vehicles");
    collection
        .update_one(
            doc! {"vehicleID": vehicle_id },
            doc! {"$set": doc! { "soldOut": true, "status": "sold_out" } },
            None,
        )
        .await?;
    Ok(())
}

/// Compensation: pull a failed booking's reserved dates back out.
/// Exact because the reservation proved none of them pre-existed.
async fn release_dates(db: &Database, vehicle_id: &str, dates: &[String]) {
    let collection = db.collection::<VehicleDocument>("vehicles");
    let result = collection
        .update_one(
            doc! {"vehicleID": vehicle_id },
            doc! {"$pullAll": doc! { "bookedDates": dates.to_vec() } },
            None,
        )
        .await;

    if let Err(value) = result {
        error!("{}", format!("Ledger:\tcould not release dates on {}: {}", vehicle_id, value));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn request(dates: Vec<&str>) -> BookingRequest {
        BookingRequest {
            vehicleID: "abc".to_string(),
            dates: dates.into_iter().map(String::from).collect(),
            guest: Contact {
                name: "Noa".to_string(),
                email: "noa@guest.app".to_string(),
            },
            host: "hana@host.app".to_string(),
            transactionId: "pi_123".to_string(),
            price: 250.0,
        }
    }

    #[test]
    fn empty_date_list_is_rejected() {
        let result = validate_request(&request(vec![]));
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let result = validate_request(&request(vec!["2024-05-01", "05/02/2024"]));
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));
    }

    #[test]
    fn impossible_calendar_date_is_rejected() {
        let result = validate_request(&request(vec!["2024-02-30"]));
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));
    }

    #[test]
    fn missing_guest_identity_is_rejected() {
        let mut bad = request(vec!["2024-05-01"]);
        bad.guest.email = "".to_string();
        let result = validate_request(&bad);
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));
    }

    #[test]
    fn missing_transaction_reference_is_rejected() {
        let mut bad = request(vec!["2024-05-01"]);
        bad.transactionId = "  ".to_string();
        let result = validate_request(&bad);
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));
    }

    #[test]
    fn duplicate_dates_collapse_in_order() {
        let dates = validate_request(&request(vec![
            "2024-06-02",
            "2024-06-01",
            "2024-06-02",
        ]))
        .unwrap();
        assert_eq!(dates, vec!["2024-06-02", "2024-06-01"]);
    }

    #[test]
    fn overlap_names_the_offending_dates() {
        let booked = vec!["2024-05-01".to_string(), "2024-05-02".to_string()];
        let requested = vec!["2024-05-02".to_string(), "2024-05-03".to_string()];
        assert_eq!(conflicting_dates(&requested, &booked), vec!["2024-05-02"]);
    }

    #[test]
    fn disjoint_requests_have_no_conflict() {
        let booked = vec!["2024-05-01".to_string()];
        let requested = vec!["2024-06-01".to_string(), "2024-06-02".to_string()];
        assert!(conflicting_dates(&requested, &booked).is_empty());
    }

    #[test]
    fn threshold_breaches_above_sixty() {
        // 59 committed + 2 admitted = 61 > 60
        assert!(breaches_threshold(61, None));
        assert!(!breaches_threshold(60, None));
        assert!(!breaches_threshold(5, None));
    }

    #[test]
    fn availability_ceiling_breaches_below_threshold() {
        assert!(breaches_threshold(30, Some(30)));
        assert!(!breaches_threshold(29, Some(30)));
    }
}
