use super::{*};
use routes_utils::*;

use rocket::http::SameSite;
use rocket::response::status::Custom;
use serde_json::{json, Value};

use ODM::ledger;
use ODM::models::*;

use log::{error, info};

///
///Token cookie issuance
///
///INPUT:  the caller's claimed identity and the cookie jar
///OUTPUT: success indicator, private 'token' cookie set
///
#[put("/auth/token", data = "<user>")]
async fn put_token(user: Json<TokenRequest>, cookies: &CookieJar<'_>, config: &State<Config>) -> Result<Json<Value>, Custom<Json<Value>>> {
    let token = match sign_token(&config.config, user.email.clone(), user.name.clone()) {
        Some(value) => value,
        None => {
            error!("{}", format!("Could not sign a token for {}", &user.email));
            return Err(reject(Status::InternalServerError, "internal", "could not sign a token".to_string()));
        },
    };

    cookies.add_private(
        Cookie::build(("token", token))
            .same_site(SameSite::Lax)
            .http_only(true)
    );

    info!("{}", format!("Server>>Client:\tIssued a token for {}", &user.email));
    Ok(Json(json!({ "success": true })))
}

///
///Save or modify a user record
///
///INPUT:  user email, the posted profile and DB access
///OUTPUT: the stored user record
///
#[put("/users/<email>", data = "<user>")]
async fn put_user(db: &State<MongoState>, email: String, user: Json<UpsertUserRequest>, route: &Route) -> Result<Json<User>, Custom<Json<Value>>> {
    let profile = user.into_inner();

    match ODM::odm::upsert_user(&db.db, email.clone(), profile.name, profile.status).await {
        Ok(value) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &email));
            Ok(Json(value))
        },
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Role / status overwrite - admin action
///
///INPUT:  admin verification, user email, the new role and DB access
///OUTPUT: the updated user record, or 404
///
#[put("/users/update/<email>", data = "<update>")]
async fn put_user_role(admin: AdminUser, db: &State<MongoState>, email: String, update: Json<RoleUpdateRequest>, route: &Route) -> Result<Json<User>, Custom<Json<Value>>> {
    let update = update.into_inner();
    let status = update.status.unwrap_or_else(|| "Verified".to_string());

    let user = match ODM::odm::update_user_role(&db.db, email.clone(), update.role, status).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &admin.0.email, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    match user {
        Some(value) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &admin.0.email));
            Ok(Json(value))
        },
        None => Err(reject(Status::NotFound, "not-found", "User not found".to_string())),
    }
}

///
///New vehicle listing
///
///INPUT:  user verification, the listing fields and DB access
///OUTPUT: the allocated vehicle ID
///
#[post("/vehicles", data = "<vehicle>")]
async fn post_vehicle(user: AuthenticatedUser, db: &State<MongoState>, vehicle: Json<VehicleRequest>, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let listing = vehicle.into_inner();

    // the host snapshot comes from the verified caller, never the body
    let host = Contact {
        name: user.name.clone(),
        email: user.email.clone(),
    };

    let inserted = ODM::odm::insert_vehicle(
        &db.db,
        listing.title,
        listing.description,
        listing.location,
        listing.image,
        listing.price,
        host,
        listing.totalAvailableDays,
    )
    .await;

    match inserted {
        Ok(value) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &user.email));
            Ok(Json(json!({ "success": true, "vehicleID": value })))
        },
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Update a vehicle listing - owning host only
///
///INPUT:  user verification, vehicle ID, the listing fields and DB access
///OUTPUT: the updated listing
///
#[put("/vehicles/<id>", data = "<vehicle>")]
async fn put_vehicle(user: AuthenticatedUser, db: &State<MongoState>, id: String, vehicle: Json<VehicleRequest>, route: &Route) -> Result<Json<Vehicle>, Custom<Json<Value>>> {
    let existing = match ODM::odm::get_vehicle(&db.db, id.clone()).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    let existing = match existing {
        Some(value) if !value.isDeleted => value,
        _ => return Err(reject(Status::NotFound, "not-found", format!("vehicle {} not found", id))),
    };

    // the host snapshot survives every update; only its owner may write
    if existing.host.email != user.email {
        return Err(reject(Status::Unauthorized, "unauthorized", "only the owning host may update a listing".to_string()));
    }

    let listing = vehicle.into_inner();
    let updated = ODM::odm::update_vehicle(
        &db.db,
        id.clone(),
        listing.title,
        listing.description,
        listing.location,
        listing.image,
        listing.price,
        listing.totalAvailableDays,
    )
    .await;

    match updated {
        Ok(Some(value)) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &user.email));
            Ok(Json(value))
        },
        Ok(None) => Err(reject(Status::NotFound, "not-found", format!("vehicle {} not found", id))),
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Soft-delete a vehicle listing - owning host only
///
///INPUT:  user verification, vehicle ID and DB access
///OUTPUT: success indicator
///
#[delete("/vehicles/<id>")]
async fn delete_vehicle(user: AuthenticatedUser, db: &State<MongoState>, id: String, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let existing = match ODM::odm::get_vehicle(&db.db, id.clone()).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    let existing = match existing {
        Some(value) if !value.isDeleted => value,
        _ => return Err(reject(Status::NotFound, "not-found", format!("vehicle {} not found", id))),
    };

    if existing.host.email != user.email {
        return Err(reject(Status::Unauthorized, "unauthorized", "only the owning host may delete a listing".to_string()));
    }

    match ODM::odm::soft_delete_vehicle(&db.db, id).await {
        Ok(_) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &user.email));
            Ok(Json(json!({ "success": true })))
        },
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Vehicle status overwrite - admin action, the only way back from sold_out
///
///INPUT:  admin verification, vehicle ID, the new status and DB access
///OUTPUT: the updated listing, or 404
///
#[patch("/vehicles/status/<id>", data = "<status>")]
async fn patch_vehicle_status(admin: AdminUser, db: &State<MongoState>, id: String, status: Json<StatusRequest>, route: &Route) -> Result<Json<Vehicle>, Custom<Json<Value>>> {
    let vehicle = match ODM::odm::set_vehicle_status(&db.db, id.clone(), status.into_inner().status).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &admin.0.email, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    match vehicle {
        Some(value) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &admin.0.email));
            Ok(Json(value))
        },
        None => Err(reject(Status::NotFound, "not-found", format!("vehicle {} not found", id))),
    }
}

///
///Booking admission - the availability ledger decides
///
///INPUT:  user verification, the booking payload, config and DB access
///OUTPUT: the new booking's ID, or the specific rejection
///
#[post("/bookings", data = "<booking>")]
async fn post_booking(user: AuthenticatedUser, db: &State<MongoState>, config: &State<Config>, booking: Json<ledger::BookingRequest>, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let request = booking.into_inner();

    let receipt = match ledger::admit_booking(&db.db, &request).await {
        Ok(value) => value,
        Err(value) => {
            info!("{}", format!("Server>>Client:\tRejecting action {} for {}: {}", route, &user.email, value));
            return Err(admission_response(&value));
        },
    };

    // Fire-and-forget: the booking stands whether or not the emails land
    mailer::mailer::notify_booking(
        config.config.clone(),
        request.guest.email.clone(),
        request.guest.name.clone(),
        request.host.clone(),
        request.transactionId.clone(),
    );

    info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &user.email));
    Ok(Json(json!({
        "success":   true,
        "bookingId": receipt.bookingId,
        "soldOut":   receipt.soldOut,
        "message":   "Booking Successful!",
    })))
}

///
///Cancel a booking - its guest or its host only
///
///INPUT:  user verification, booking ID and DB access
///OUTPUT: success indicator
///
#[delete("/bookings/<id>")]
async fn delete_booking(user: AuthenticatedUser, db: &State<MongoState>, id: String, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let booking = match ODM::odm::get_booking(&db.db, id.clone()).await {
        Ok(value) => value,
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            return Err(reject(Status::InternalServerError, "internal", "database failure".to_string()));
        },
    };

    let booking = match booking {
        Some(value) if !value.isDeleted => value,
        _ => return Err(reject(Status::NotFound, "not-found", format!("booking {} not found", id))),
    };

    if booking.guest.email != user.email && booking.host != user.email {
        return Err(reject(Status::Unauthorized, "unauthorized", "only the booking's guest or host may cancel it".to_string()));
    }

    match ODM::odm::cancel_booking(&db.db, id).await {
        Ok(_) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &user.email));
            Ok(Json(json!({ "success": true })))
        },
        Err(value) => {
            error!("{}", format!("Database failed while getting {} for {}: {}", route, &user.email, value));
            Err(reject(Status::InternalServerError, "internal", "database failure".to_string()))
        },
    }
}

///
///Payment intent creation
///
///INPUT:  user verification, the price and config
///OUTPUT: the Stripe client secret
///
#[post("/create-payment-intent", data = "<payment>")]
async fn post_payment_intent(user: AuthenticatedUser, config: &State<Config>, payment: Json<PaymentRequest>, route: &Route) -> Result<Json<Value>, Custom<Json<Value>>> {
    let price = payment.price;
    if !(price > 0.0) || ((price * 100.0) as i64) < 1 {
        return Err(reject(Status::BadRequest, "invalid-input", "price must be a positive amount".to_string()));
    }

    match payments::payments::create_payment_intent(&config.config, price).await {
        Ok(value) => {
            info!("{}", format!("Server>>Client:\tApproving action {} for {}", route, &user.email));
            Ok(Json(json!({ "clientSecret": value })))
        },
        Err(value) => {
            error!("{}", format!("Payment processor failed for {}: {}", &user.email, value));
            Err(reject(Status::InternalServerError, "internal", "payment processor failure".to_string()))
        },
    }
}


pub fn post_routes() -> Vec<Route> {
    return routes![
        put_token, put_user, put_user_role, post_vehicle, put_vehicle,
        delete_vehicle, patch_vehicle_status, post_booking, delete_booking,
        post_payment_intent];
}
