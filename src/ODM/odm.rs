//!
//! Documentation of the odm module.
//! Used to connect to the VehiQuest database.
//!




use super::*;
use models::*;
use odm_utils::*;
use config::config::ConfyConfig;
use std::time::Duration;

use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Database;

use futures::stream::TryStreamExt;
use mongodb::options::FindOneAndUpdateOptions;
use mongodb::options::FindOptions;
use mongodb::options::ReturnDocument;

use mongodb::options::ClientOptions;
use mongodb::Client;
use mongodb::options::ListDatabasesOptions;
use log::{error, info};

///
/// Initiate DB connection
///
///
/// # Arguments
///
/// * `config` - A config object containing 'database' and 'database_ip'
///
///
/// # Log
///
/// * `info` - "Database Connected!", indicating success
/// * `error` - "Could not connect to MongoDB {error}", indicating error
///
pub async fn init(config: &ConfyConfig) -> mongodb::error::Result<Database> {
    connect(&config).await
}

/// basic connection, isn't available out of the "odm.rs" module
async fn connect(config: &ConfyConfig) -> mongodb::error::Result<Database> {

    let mut client_options = ClientOptions::parse(&config.database_ip).await?;
    client_options.connect_timeout = Some(Duration::from_secs(config.timeout));
    client_options.heartbeat_freq = Some(Duration::from_secs(config.timeout));
    client_options.server_selection_timeout = Some(Duration::from_secs(config.timeout));
    let client = Client::with_options(client_options)?;

    match client.list_database_names(Document::new(), ListDatabasesOptions::builder().build()).await {
        Ok(_) => {
            info!("Database Connected!");
        },
        Err(value) => {
            error!("{}", format!("Could not connect to MongoDB {}", value));
            return Err(value);
        },
    }

    let database = client.database(&config.database[..]);

    Ok(database)
}

//
// USER ACTIONS
//

/// Get user by email
pub async fn get_user_by_email(
    db: &Database,
    email: String,
) -> mongodb::error::Result<Option<User>> {
    let collection = db.collection::<UserDocument>("users");

    let user_doc = collection.find_one(doc! {"email": email }, None).await?;
    if user_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = user_doc.unwrap();
    // transform ObjectId to String
    let user_json = doc_to_user(&unwrapped_doc);

    Ok(Some(user_json))
}

///
/// Save-or-modify a user record.
///
/// A new email gets a fresh guest account with an onboarding timestamp.
/// An existing account is returned untouched, unless the caller is asking
/// to become a host (`status == "Requested"`), which is recorded.
///
/// # Arguments
///
/// * `database` - Refrence to a database object
/// * `email` - the account's lookup key
/// * `name` - display name
/// * `status` - the requested account status, if any
///
pub async fn upsert_user(
    db: &Database,
    email: String,
    name: String,
    status: Option<String>,
) -> mongodb::error::Result<User> {
    let collection = db.collection::<UserDocument>("users");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let existing = get_user_by_email(&db, email.clone()).await?;

    if let Some(user) = existing {
        if status.as_deref() != Some("Requested") {
            return Ok(user);
        }

        let user_doc = collection
            .find_one_and_update(
                doc! {"email": email },
                doc! {"$set": doc! { "status": "Requested" } },
                find_one_and_update_options,
            )
            .await?;

        return match user_doc {
            Some(value) => Ok(doc_to_user(&value)),
            None => Ok(user),
        };
    }

    let timestamp = DateTime::now().timestamp_millis();
    let insert_doc = UserDocument {
        _id: None,
        email: email.clone(),
        name,
        role: Role::Guest,
        status: status.unwrap_or_else(|| "Verified".to_string()),
        timestamp,
    };
    collection.insert_one(&insert_doc, None).await?;

    Ok(doc_to_user(&insert_doc))
}

/// Get all users - admin view
pub async fn get_all_users(db: &Database) -> mongodb::error::Result<Vec<User>> {
    let collection = db.collection::<UserDocument>("users");
    let find_options = FindOptions::builder().build();

    let mut cursor = collection.find(None, find_options).await?;

    let mut users: Vec<User> = vec![];
    while let Some(result) = cursor.try_next().await? {
        users.push(doc_to_user(&result));
    }

    Ok(users)
}

///
/// Overwrite a user's role / status (admin action), refreshing the timestamp
///
/// # Arguments
///
/// * `database` - Refrence to a database object
/// * `email` - the account's lookup key
/// * `role` - the new role
/// * `status` - the new account status
///
pub async fn update_user_role(
    db: &Database,
    email: String,
    role: Role,
    status: String,
) -> mongodb::error::Result<Option<User>> {
    let collection = db.collection::<UserDocument>("users");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let role = bson::to_bson(&role).unwrap_or(bson::Bson::String("guest".to_string()));

    let user_doc = collection
        .find_one_and_update(
            doc! {"email": email },
            doc! {"$set": doc! {
                "role":      role,
                "status":    status,
                "timestamp": DateTime::now().timestamp_millis(),
            } },
            find_one_and_update_options,
        )
        .await?;

    if user_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = user_doc.unwrap();
    // transform ObjectId to String
    let user_json = doc_to_user(&unwrapped_doc);

    Ok(Some(user_json))
}

/// Get the onboarding timestamp of a user
pub async fn get_user_timestamp(db: &Database, email: String) -> mongodb::error::Result<Option<i64>> {
    let user = get_user_by_email(&db, email).await?;

    match user {
        None => return Ok(None),
        Some(value) => return Ok(Some(value.timestamp)),
    }
}

//
// VEHICLE ACTIONS
//

/// Gets all the non-deleted vehicle listings
pub async fn get_all_vehicles(db: &Database) -> mongodb::error::Result<Vec<Vehicle>> {
    let collection = db.collection::<VehicleDocument>("vehicles");
    let find_options = FindOptions::builder().build();

    let mut cursor = collection.find(doc! {"isDeleted": false }, find_options).await?;

    let mut vehicles: Vec<Vehicle> = vec![];
    while let Some(result) = cursor.try_next().await? {
        vehicles.push(doc_to_vehicle(&result));
    }
    Ok(vehicles)
}

/// Get vehicle by it's ID (soft-deleted included, the caller decides)
pub async fn get_vehicle(db: &Database, id: String) -> mongodb::error::Result<Option<Vehicle>> {
    let collection = db.collection::<VehicleDocument>("vehicles");

    let vehicle_doc = collection.find_one(doc! {"vehicleID": id }, None).await?;
    if vehicle_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = vehicle_doc.unwrap();
    // transform ObjectId to String
    let vehicle_json = doc_to_vehicle(&unwrapped_doc);

    Ok(Some(vehicle_json))
}

/// Gets all the listings owned by a given host
pub async fn get_vehicles_for_host(
    db: &Database,
    email: String,
) -> mongodb::error::Result<Vec<Vehicle>> {
    let collection = db.collection::<VehicleDocument>("vehicles");
    let find_options = FindOptions::builder().build();

    let mut cursor = collection
        .find(doc! {"host.email": email, "isDeleted": false }, find_options)
        .await?;

    let mut vehicles: Vec<Vehicle> = vec![];
    while let Some(result) = cursor.try_next().await? {
        vehicles.push(doc_to_vehicle(&result));
    }
    Ok(vehicles)
}

/// Insert a given vehicle listing to the database, with an empty ledger
pub async fn insert_vehicle(
    db: &Database,
    title: String,
    description: String,
    location: String,
    image: String,
    price: f64,
    host: Contact,
    total_available_days: Option<i64>,
) -> mongodb::error::Result<String> {
    let collection = db.collection::<VehicleDocument>("vehicles");

    let id = ObjectId::new().to_hex();

    let insert_doc = VehicleDocument {
        _id: None,
        vehicleID: id.clone(),
        title,
        description,
        location,
        image,
        price,
        host,
        bookedDates: vec![],
        totalAvailableDays: total_available_days,
        status: VehicleStatus::Active,
        soldOut: false,
        isDeleted: false,
    };
    collection.insert_one(&insert_doc, None).await?;

    Ok(id)
}

///
/// Update a vehicle's listing fields.
///
/// The ledger fields (`bookedDates`, `soldOut`, `status`) and the host
/// snapshot are not touched here; they move only through the admission
/// procedure and the admin status reset.
///
pub async fn update_vehicle(
    db: &Database,
    id: String,
    title: String,
    description: String,
    location: String,
    image: String,
    price: f64,
    total_available_days: Option<i64>,
) -> mongodb::error::Result<Option<Vehicle>> {
    let collection = db.collection::<VehicleDocument>("vehicles");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let mut fields = doc! {
        "title":       title,
        "description": description,
        "location":    location,
        "image":       image,
        "price":       price,
    };
    match total_available_days {
        Some(value) => { fields.insert("totalAvailableDays", value); },
        None => { },
    }

    let vehicle_doc = collection
        .find_one_and_update(
            doc! {"vehicleID": id, "isDeleted": false },
            doc! {"$set": fields },
            find_one_and_update_options,
        )
        .await?;

    if vehicle_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = vehicle_doc.unwrap();
    // transform ObjectId to String
    let vehicle_json = doc_to_vehicle(&unwrapped_doc);

    Ok(Some(vehicle_json))
}

/// Soft-deletes a vehicle listing
pub async fn soft_delete_vehicle(
    db: &Database,
    id: String,
) -> mongodb::error::Result<Option<Vehicle>> {
    let collection = db.collection::<VehicleDocument>("vehicles");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let vehicle_doc = collection
        .find_one_and_update(
            doc! {"vehicleID": id },
            doc! {"$set": doc! { "isDeleted": true } },
            find_one_and_update_options,
        )
        .await?;

    if vehicle_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = vehicle_doc.unwrap();
    // transform ObjectId to String
    let vehicle_json = doc_to_vehicle(&unwrapped_doc);

    Ok(Some(vehicle_json))
}

///
/// Admin status overwrite. This is the only path that can take a vehicle
/// out of sold_out: the `soldOut` flag follows the written status.
///
pub async fn set_vehicle_status(
    db: &Database,
    id: String,
    status: VehicleStatus,
) -> mongodb::error::Result<Option<Vehicle>> {
    let collection = db.collection::<VehicleDocument>("vehicles");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let sold_out = status == VehicleStatus::SoldOut;
    let status = bson::to_bson(&status).unwrap_or(bson::Bson::String("active".to_string()));

    let vehicle_doc = collection
        .find_one_and_update(
            doc! {"vehicleID": id },
            doc! {"$set": doc! { "status": status, "soldOut": sold_out } },
            find_one_and_update_options,
        )
        .await?;

    if vehicle_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = vehicle_doc.unwrap();
    // transform ObjectId to String
    let vehicle_json = doc_to_vehicle(&unwrapped_doc);

    Ok(Some(vehicle_json))
}

//
// BOOKING ACTIONS
//

/// Gets all the bookings a guest has booked
pub async fn get_bookings_for_guest(
    db: &Database,
    email: String,
) -> mongodb::error::Result<Vec<Booking>> {
    let collection = db.collection::<BookingDocument>("bookings");
    let find_options = FindOptions::builder().build();

    let mut cursor = collection
        .find(doc! {"guest.email": email, "isDeleted": false }, find_options)
        .await?;

    let mut bookings: Vec<Booking> = vec![];
    while let Some(result) = cursor.try_next().await? {
        bookings.push(doc_to_booking(&result));
    }
    Ok(bookings)
}

/// Gets all the bookings placed against a host's listings
pub async fn get_bookings_for_host(
    db: &Database,
    email: String,
) -> mongodb::error::Result<Vec<Booking>> {
    let collection = db.collection::<BookingDocument>("bookings");
    let find_options = FindOptions::builder().build();

    let mut cursor = collection
        .find(doc! {"host": email, "isDeleted": false }, find_options)
        .await?;

    let mut bookings: Vec<Booking> = vec![];
    while let Some(result) = cursor.try_next().await? {
        bookings.push(doc_to_booking(&result));
    }
    Ok(bookings)
}

/// Get booking by it's ID
pub async fn get_booking(db: &Database, id: String) -> mongodb::error::Result<Option<Booking>> {
    let collection = db.collection::<BookingDocument>("bookings");

    let object_id = match ObjectId::parse_str(&id) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };

    let booking_doc = collection.find_one(doc! {"_id": object_id }, None).await?;
    if booking_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = booking_doc.unwrap();
    // transform ObjectId to String
    let booking_json = doc_to_booking(&unwrapped_doc);

    Ok(Some(booking_json))
}

/// Soft-cancels a booking. The vehicle's committed dates are NOT released.
pub async fn cancel_booking(
    db: &Database,
    id: String,
) -> mongodb::error::Result<Option<Booking>> {
    let collection = db.collection::<BookingDocument>("bookings");
    let find_one_and_update_options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let object_id = match ObjectId::parse_str(&id) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };

    let booking_doc = collection
        .find_one_and_update(
            doc! {"_id": object_id },
            doc! {"$set": doc! { "status": "cancelled", "isDeleted": true } },
            find_one_and_update_options,
        )
        .await?;

    if booking_doc.is_none() {
        return Ok(None);
    }

    let unwrapped_doc = booking_doc.unwrap();
    // transform ObjectId to String
    let booking_json = doc_to_booking(&unwrapped_doc);

    Ok(Some(booking_json))
}

//
// STAT ACTIONS
//

/// (createdAt, price) projection of the bookings matching a filter
pub async fn get_sales(
    db: &Database,
    mut filter: Document,
) -> mongodb::error::Result<Vec<(DateTime, f64)>> {
    let collection = db.collection::<Document>("bookings");
    let find_options = FindOptions::builder()
        .projection(doc! {"createdAt": 1, "price": 1 })
        .build();

    filter.insert("isDeleted", false);
    let mut cursor = collection.find(filter, find_options).await?;

    let mut sales: Vec<(DateTime, f64)> = vec![];
    while let Some(result) = cursor.try_next().await? {
        let created = match result.get_datetime("createdAt") {
            Ok(value) => *value,
            Err(_) => continue,
        };
        let price = result.get_f64("price").unwrap_or(0.0);
        sales.push((created, price));
    }
    Ok(sales)
}

/// Count users
pub async fn count_users(db: &Database) -> mongodb::error::Result<u64> {
    let collection = db.collection::<UserDocument>("users");
    collection.count_documents(None, None).await
}

/// Count non-deleted vehicles, optionally scoped to one host
pub async fn count_vehicles(db: &Database, host: Option<String>) -> mongodb::error::Result<u64> {
    let collection = db.collection::<VehicleDocument>("vehicles");

    let filter = match host {
        Some(email) => doc! {"host.email": email, "isDeleted": false },
        None => doc! {"isDeleted": false },
    };
    collection.count_documents(filter, None).await
}
