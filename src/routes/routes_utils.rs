use super::*;
use config::config::ConfyConfig;
use rocket::outcome::try_outcome;
use rocket::request::{Request, FromRequest, Outcome};
use rocket::response::status::Custom;
use ODM::ledger::AdmissionError;
use ODM::models::*;
use ODM::odm;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Value};

use log::{error, info};

// Models for Input Check and Login Check
#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct TokenRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct UpsertUserRequest {
    #[serde(default)]
    pub name: String,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct RoleUpdateRequest {
    pub role: Role,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct VehicleRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    pub totalAvailableDays: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct StatusRequest {
    pub status: VehicleStatus,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct PaymentRequest {
    pub price: f64,
}

/// What goes inside the signed token cookie
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub exp: i64,
}

/// Signs a token for the `token` private cookie
pub fn sign_token(config: &ConfyConfig, email: String, name: String) -> Option<String> {
    let expiry = chrono::Utc::now() + chrono::Duration::days(config.token_days);
    let claims = Claims {
        email,
        name,
        exp: expiry.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
    .ok()
}

/// Verifies a token cookie's value, None when expired or tampered
pub fn verify_token(config: &ConfyConfig, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// The caller behind a valid token cookie
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
    pub name: String,
}

/// A caller whose account carries the host role
pub struct HostUser(pub User);

/// A caller whose account carries the admin role
pub struct AdminUser(pub User);

// Checking that a user is connected
#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<AuthenticatedUser, ()> {
        let cookies = request.cookies();

        let config = match request.rocket().state::<Config>() {
            Some(value) => value,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        let route = match request.route() {
            None => format!("Unknown Route"),
            Some(value) => format!("{}", value),
        };
        let method = request.method();
        if let Some(cookie) = cookies.get_private("token") {

            if let Some(claims) = verify_token(&config.config, cookie.value()) {
                info!("{}", format!("Client>>Server:\t{} is trying to access route: {} as {}", &claims.email, route, method));

                return Outcome::Success(AuthenticatedUser {
                    email: claims.email,
                    name: claims.name,
                });
            }
        }

        Outcome::Error((Status::Unauthorized, ()))
    }
}

// Role check against the users collection (the token only proves identity)
#[rocket::async_trait]
impl<'r> FromRequest<'r> for HostUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<HostUser, ()> {
        let user = try_outcome!(request.guard::<AuthenticatedUser>().await);

        let db = match request.rocket().state::<MongoState>() {
            Some(value) => value,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        match odm::get_user_by_email(&db.db, user.email.clone()).await {
            Ok(Some(record)) if record.role == Role::Host => Outcome::Success(HostUser(record)),
            Ok(_) => Outcome::Error((Status::Unauthorized, ())),
            Err(value) => {
                error!("{}", format!("Database failed while checking the host role for {}: {}", &user.email, value));
                Outcome::Error((Status::InternalServerError, ()))
            },
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<AdminUser, ()> {
        let user = try_outcome!(request.guard::<AuthenticatedUser>().await);

        let db = match request.rocket().state::<MongoState>() {
            Some(value) => value,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        match odm::get_user_by_email(&db.db, user.email.clone()).await {
            Ok(Some(record)) if record.role == Role::Admin => Outcome::Success(AdminUser(record)),
            Ok(_) => Outcome::Error((Status::Unauthorized, ())),
            Err(value) => {
                error!("{}", format!("Database failed while checking the admin role for {}: {}", &user.email, value));
                Outcome::Error((Status::InternalServerError, ()))
            },
        }
    }
}

/// Uniform rejection body: a machine-checkable code plus a readable message
pub fn reject(status: Status, code: &str, message: String) -> Custom<Json<Value>> {
    Custom(
        status,
        Json(json!({ "error": code, "message": message })),
    )
}

/// Maps an admission rejection onto the wire
pub fn admission_response(error: &AdmissionError) -> Custom<Json<Value>> {
    match error {
        AdmissionError::NotFound(_) => {
            reject(Status::NotFound, "not-found", error.to_string())
        },
        AdmissionError::DatesTaken(dates) => Custom(
            Status::Conflict,
            Json(json!({
                "error": "conflict",
                "message": "some dates are already booked",
                "conflictingDates": dates,
            })),
        ),
        AdmissionError::SoldOut(_) => {
            reject(Status::Conflict, "sold-out", error.to_string())
        },
        AdmissionError::InvalidRequest(_) => {
            reject(Status::UnprocessableEntity, "invalid-input", error.to_string())
        },
        AdmissionError::Contended => {
            reject(Status::ServiceUnavailable, "contended", error.to_string())
        },
        AdmissionError::Database(_) => reject(
            Status::InternalServerError,
            "internal",
            "database failure".to_string(),
        ),
    }
}

// Utils struct for rocket::manage
pub struct MongoState {
    pub db: mongodb::Database,
}

pub struct Config {
    pub config: ConfyConfig,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_keeps_identity() {
        let config = ConfyConfig::default();
        let token = sign_token(&config, "noa@guest.app".to_string(), "Noa".to_string()).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.email, "noa@guest.app");
        assert_eq!(claims.name, "Noa");
    }

    #[test]
    fn tampered_token_is_refused() {
        let config = ConfyConfig::default();
        let token = sign_token(&config, "noa@guest.app".to_string(), "Noa".to_string()).unwrap();

        let mut other = ConfyConfig::default();
        other.token_secret = "a-different-secret".to_string();
        assert!(verify_token(&other, &token).is_none());
    }

    #[test]
    fn conflict_response_names_the_dates() {
        let response = admission_response(&AdmissionError::DatesTaken(vec![
            "2024-05-02".to_string(),
        ]));
        assert_eq!(response.0, Status::Conflict);
        assert_eq!(response.1 .0["conflictingDates"][0], "2024-05-02");
    }
}
