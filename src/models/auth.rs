//! Authenticated user extracted from the session identity.
//!
//! The identity cookie stores a JWT issued by the external auth service and
//! signed with the shared secret from [`ServerConfig`].

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, UserEmail};
use crate::models::config::ServerConfig;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Decodes and validates a session token.
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Signs the claims into a session token.
    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn user_email(&self) -> Result<UserEmail, TypeConstraintError> {
        UserEmail::new(self.email.as_str())
    }

    /// First word of the display name, used in greetings.
    pub fn given_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let identity = req
        .get_identity()
        .map_err(|_| ErrorUnauthorized("Not signed in"))?;
    let token = identity
        .id()
        .map_err(|_| ErrorUnauthorized("Invalid identity"))?;

    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorUnauthorized("Server misconfigured"))?;

    AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ErrorUnauthorized("Invalid token")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "John@Example.com".to_string(),
            name: "John Smith".to_string(),
            roles: vec!["loaner".to_string()],
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn jwt_round_trip() {
        let token = user().to_jwt("secret").unwrap();
        assert_eq!(AuthenticatedUser::from_jwt(&token, "secret").unwrap(), user());
        assert!(AuthenticatedUser::from_jwt(&token, "other").is_err());
    }

    #[test]
    fn given_name_is_first_word() {
        assert_eq!(user().given_name(), "John");
    }

    #[test]
    fn user_email_is_normalized() {
        assert_eq!(user().user_email().unwrap().as_str(), "john@example.com");
    }
}
