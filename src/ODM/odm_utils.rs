//!
//! Documentation of the Database Utilities module.
//! Contains all the utilities needed for a VehiQuest connection.
//!

use super::*;
use models::*;
use serde_json::{json, Value};

/// Converts a UserDocument to User
pub fn doc_to_user(document: &UserDocument) -> User {
    let _id =       &document._id;
    let email =     &document.email;
    let name =      &document.name;
    let role =      &document.role;
    let status =    &document.status;
    let timestamp = &document.timestamp;

    // transform ObjectId to String
    let user_json = User {
        _id:       _id.unwrap_or_default().to_string(),
        email:     email.to_string(),
        name:      name.to_string(),
        role:      role.clone(),
        status:    status.to_string(),
        timestamp: timestamp.to_owned(),
    };
    user_json
}

/// Converts a VehicleDocument to Vehicle
pub fn doc_to_vehicle(document: &VehicleDocument) -> Vehicle {
    // The ID of the model.
    let _id       = document._id;
    // The internal ID
    let vehicleID = &document.vehicleID;
    // Snapshot of the owning host
    let host      = &document.host;
    // The committed-date ledger
    let booked    = &document.bookedDates;

    // transform ObjectId to String
    let vehicle_json = Vehicle {
        _id: _id.unwrap_or_default().to_string(),
        vehicleID:   vehicleID.to_string(),
        title:       document.title.clone(),
        description: document.description.clone(),
        location:    document.location.clone(),
        image:       document.image.clone(),
        price:       document.price,
        host:        host.clone(),
        bookedDates: booked.clone(),
        totalAvailableDays: document.totalAvailableDays,
        status:      document.status.clone(),
        soldOut:     document.soldOut,
        isDeleted:   document.isDeleted,
    };
    vehicle_json
}

/// Converts a BookingDocument to Booking
pub fn doc_to_booking(document: &BookingDocument) -> Booking {
    let _id = document._id;

    // transform ObjectId to String
    let booking_json = Booking {
        _id: _id.unwrap_or_default().to_string(),
        vehicleID:     document.vehicleID.clone(),
        dates:         document.dates.clone(),
        guest:         document.guest.clone(),
        host:          document.host.clone(),
        transactionId: document.transactionId.clone(),
        price:         document.price,
        createdAt:     document.createdAt,
        status:        document.status.clone(),
        isDeleted:     document.isDeleted,
    };
    booking_json
}

///
/// Builds the stat chart rows: a header row followed by one
/// ["day/month", price] row per booking.
///
/// # Arguments
///
/// * `sales` - (creation time, price) of each booking
/// * `label` - second header cell ("Sale" / "Reservation")
///
pub fn chart_rows(sales: &[(bson::DateTime, f64)], label: &str) -> Vec<Value> {
    let mut rows: Vec<Value> = vec![json!(["Day", label])];

    for (created, price) in sales {
        let day_month = created.to_chrono().format("%-d/%-m").to_string();
        rows.push(json!([day_month, price]));
    }

    rows
}

/// Sums the price column of the stat projection
pub fn total_of(sales: &[(bson::DateTime, f64)]) -> f64 {
    sales.iter().map(|(_, price)| price).sum()
}


#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn chart_rows_start_with_header() {
        let rows = chart_rows(&[], "Sale");
        assert_eq!(rows, vec![json!(["Day", "Sale"])]);
    }

    #[test]
    fn chart_rows_format_day_slash_month() {
        let created = bson::DateTime::from_chrono(
            chrono::DateTime::parse_from_rfc3339("2024-06-03T12:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let rows = chart_rows(&[(created, 120.0)], "Reservation");
        assert_eq!(rows[0], json!(["Day", "Reservation"]));
        assert_eq!(rows[1], json!(["3/6", 120.0]));
    }

    #[test]
    fn total_sums_prices() {
        let now = bson::DateTime::now();
        let sales = vec![(now, 10.5), (now, 20.0), (now, 0.5)];
        assert_eq!(total_of(&sales), 31.0);
    }

    #[test]
    fn doc_to_vehicle_keeps_ledger_and_host() {
        let document = VehicleDocument {
            _id: Some(ObjectId::new()),
            vehicleID: "abc".into(),
            title: "Sedan".into(),
            description: "".into(),
            location: "".into(),
            image: "".into(),
            price: 55.0,
            host: Contact { name: "Hana".into(), email: "hana@host.app".into() },
            bookedDates: vec!["2024-05-01".into(), "2024-05-02".into()],
            totalAvailableDays: Some(90),
            status: VehicleStatus::Active,
            soldOut: false,
            isDeleted: false,
        };
        let vehicle = doc_to_vehicle(&document);
        assert_eq!(vehicle.vehicleID, "abc");
        assert_eq!(vehicle.bookedDates.len(), 2);
        assert_eq!(vehicle.host.email, "hana@host.app");
        assert_eq!(vehicle.status, VehicleStatus::Active);
    }
}
