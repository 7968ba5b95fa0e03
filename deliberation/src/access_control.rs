use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{self, FromRequest, Request};

use crate::models::User;
use crate::Db;

/// Header carrying the username of the caller. Login itself is handled in
/// front of this service.
pub const AUTH_HEADER: &str = "X-Plain-Text-Auth";

/// The authenticated caller. Every route takes this guard; requests without a
/// known user are answered with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn into_user(self) -> User {
        self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let username = match request.headers().get_one(AUTH_HEADER) {
            Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
            _ => return request::Outcome::Error((Status::Unauthorized, ())),
        };

        let db = try_outcome!(request.guard::<Db>().await);
        let lookup = username.clone();
        match db.run(move |conn| User::by_username(conn, &lookup)).await {
            Ok(Some(user)) => request::Outcome::Success(AuthUser(user)),
            Ok(None) => {
                log::debug!("rejecting unknown user {:?}", username);
                request::Outcome::Error((Status::Unauthorized, ()))
            }
            Err(e) => {
                log::error!("could not look up user {:?}: {}", username, e);
                request::Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
