use super::{*};
use routes_utils::*;

use bson::doc;
use rocket::response::status::Custom;
use serde_json::{json, Value};

use log::{error, info};

///
///Liveness greeting
///
///INPUT:  nothing
///OUTPUT: a plain greeting
///
#[get("/")]
async fn index() -> &'static str {
    "Hello from VehiQuest Server.."
}

///
///Logout
///
///INPUT:  user's cookies
///OUTPUT: success indicator, cookie cleared
///
#[get("/logout")]
async fn logout(cookies: &CookieJar<'_>) -> Json<Value> {

    if let Some(_cookie) = cookies.get_private("token") {
        cookies.remove_private(Cookie::from("token"));
        info!("Logout successful");
    }

    Json(json!({ "success": true }))
}

///
///All vehicle listings
///
///INPUT:  DB access
///OUTPUT: every non-deleted listing
///
#[get("/vehicles")]
async fn get_vehicles(db: &State<MongoState>, route: &Route) -> Result<Json<Vec<Vehicle>>, Custom<Json<Value>>> {
    match ODM::odm::get_all_vehicles(&db.db).await {
        Ok(value) => Ok(Json(value)),
        Err(value) => {
            error!("{}", format!("Database failed while getting {}: {}", route, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Single vehicle listing
///
///INPUT:  vehicle ID and DB access
///OUTPUT: the listing, or 404
///
#[get("/vehicle/<id>")]
async fn get_vehicle(db: &State<MongoState>, id: String, route: &Route) -> Result<Json<Vehicle>, Custom<Json<Value>>> {
    let vehicle = match ODM::odm::get_vehicle(&db.db, id.clone()).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {}: {}", route, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    match vehicle {
        Some(value) if !value.isDeleted => Ok(Json(value)),
        _ => Err(reject(Status::NotFound, "not-found", format!("vehicle {} not found", id))),
    }
}

///
///A host's own listings
///
///INPUT:  host verification, host email and DB access
///OUTPUT: the host's non-deleted listings
///
#[get("/vehicles/host/<email>")]
async fn get_host_vehicles(host: HostUser, db: &State<MongoState>, email: String, route: &Route) -> Result<Json<Vec<Vehicle>>, Custom<Json<Value>>> {
    if host.0.email != email {
        return Err(reject(Status::Forbidden, "unauthorized", "hosts may only list their own vehicles".to_string()));
    }

    match ODM::odm::get_vehicles_for_host(&db.db, email).await {
        Ok(value) => Ok(Json(value)),
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &host.0.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///A guest's bookings
///
///INPUT:  user verification and DB access
///OUTPUT: the caller's own bookings
///
#[get("/bookings?<email>")]
async fn get_bookings(user: AuthenticatedUser, db: &State<MongoState>, email: Option<String>, route: &Route) -> Result<Json<Vec<Booking>>, Custom<Json<Value>>> {
    if let Some(value) = &email {
        if value != &user.email {
            return Err(reject(Status::Forbidden, "unauthorized", "guests may only list their own bookings".to_string()));
        }
    }

    match ODM::odm::get_bookings_for_guest(&db.db, user.email.clone()).await {
        Ok(value) => Ok(Json(value)),
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Bookings placed against a host's listings
///
///INPUT:  host verification and DB access
///OUTPUT: the bookings on the host's vehicles
///
#[get("/bookings/host?<email>")]
async fn get_host_bookings(host: HostUser, db: &State<MongoState>, email: Option<String>, route: &Route) -> Result<Json<Vec<Booking>>, Custom<Json<Value>>> {
    if let Some(value) = &email {
        if value != &host.0.email {
            return Err(reject(Status::Forbidden, "unauthorized", "hosts may only list their own bookings".to_string()));
        }
    }

    match ODM::odm::get_bookings_for_host(&db.db, host.0.email.clone()).await {
        Ok(value) => Ok(Json(value)),
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &host.0.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Role lookup
///
///INPUT:  user email and DB access
///OUTPUT: the user record, or 404
///
#[get("/users/<email>")]
async fn get_user(db: &State<MongoState>, email: String, route: &Route) -> Result<Json<User>, Custom<Json<Value>>> {
    let user = match ODM::odm::get_user_by_email(&db.db, email.clone()).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {}: {}", route, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    match user {
        Some(value) => Ok(Json(value)),
        None => Err(reject(Status::NotFound, "not-found", "User not found".to_string())),
    }
}

///
///All users - admin view
///
///INPUT:  admin verification and DB access
///OUTPUT: every user record
///
#[get("/users")]
async fn get_users(admin: AdminUser, db: &State<MongoState>, route: &Route) -> Result<Json<Vec<User>>, Custom<Json<Value>>> {
    match ODM::odm::get_all_users(&db.db).await {
        Ok(value) => Ok(Json(value)),
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &admin.0.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Marketplace-wide statistics - admin view
///
///INPUT:  admin verification and DB access
///OUTPUT: totals and the sale chart rows
///
#[get("/admin-stat")]
async fn admin_stat(admin: AdminUser, db: &State<MongoState>, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let internal = |value: mongodb::error::Error| {
        error!("{}", format!("Database failed while getting {} for {}: {}", route, &admin.0.email, value));
        reject(Status::InternalServerError, "internal", "database failure".to_string())
    };

    let sales = ODM::odm::get_sales(&db.db, doc! {}).await.map_err(|value| internal(value))?;
    let user_count = ODM::odm::count_users(&db.db).await.map_err(|value| internal(value))?;
    let vehicle_count = ODM::odm::count_vehicles(&db.db, None).await.map_err(|value| internal(value))?;

    Ok(Json(json!({
        "totalSale":    ODM::odm_utils::total_of(&sales),
        "bookingCount": sales.len(),
        "userCount":    user_count,
        "vehicleCount": vehicle_count,
        "chartData":    ODM::odm_utils::chart_rows(&sales, "Sale"),
    })))
}

///
///A host's own statistics
///
///INPUT:  host verification and DB access
///OUTPUT: the host's totals, chart rows and onboarding time
///
#[get("/host-stat")]
async fn host_stat(host: HostUser, db: &State<MongoState>, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let email = host.0.email.clone();
    let internal = |value: mongodb::error::Error| {
        error!("{}", format!("Database failed while getting {} for {}: {}", route, &email, value));
        reject(Status::InternalServerError, "internal", "database failure".to_string())
    };

    let sales = ODM::odm::get_sales(&db.db, doc! {"host": &host.0.email }).await.map_err(|value| internal(value))?;
    let vehicle_count = ODM::odm::count_vehicles(&db.db, Some(host.0.email.clone())).await.map_err(|value| internal(value))?;

    Ok(Json(json!({
        "totalSale":    ODM::odm_utils::total_of(&sales),
        "bookingCount": sales.len(),
        "vehicleCount": vehicle_count,
        "chartData":    ODM::odm_utils::chart_rows(&sales, "Sale"),
        "hostSince":    host.0.timestamp,
    })))
}

///
///A guest's own statistics
///
///INPUT:  user verification and DB access
///OUTPUT: the guest's spend, chart rows and onboarding time
///
#[get("/guest-stat")]
async fn guest_stat(user: AuthenticatedUser, db: &State<MongoState>, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let email = user.email.clone();
    let internal = |value: mongodb::error::Error| {
        error!("{}", format!("Database failed while getting {} for {}: {}", route, &email, value));
        reject(Status::InternalServerError, "internal", "database failure".to_string())
    };

    let sales = ODM::odm::get_sales(&db.db, doc! {"guest.email": &user.email }).await.map_err(|value| internal(value))?;
    let guest_since = ODM::odm::get_user_timestamp(&db.db, user.email.clone()).await.map_err(|value| internal(value))?;

    Ok(Json(json!({
        "totalSpent":   ODM::odm_utils::total_of(&sales),
        "bookingCount": sales.len(),
        "chartData":    ODM::odm_utils::chart_rows(&sales, "Reservation"),
        "guestSince":   guest_since,
    })))
}


pub fn get_routes() -> Vec<Route> {
    return routes![
        index, logout, get_vehicles, get_vehicle, get_host_vehicles,
        get_bookings, get_host_bookings, get_user, get_users,
        admin_stat, host_stat, guest_stat];
}
