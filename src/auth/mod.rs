//! Request authentication
//!
//! Resolves the caller's user id from a bearer JWT. Anything else about the
//! identity provider is out of our hands.

pub mod jwt;

use hyper::header::AUTHORIZATION;
use hyper::HeaderMap;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput, TokenValidationResult};

use crate::types::KarmaError;

/// The caller, as established by a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Resolve the caller from the `Authorization` header
pub fn authenticate(headers: &HeaderMap, jwt: &JwtValidator) -> Result<AuthenticatedUser, KarmaError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = extract_token_from_header(header).ok_or(KarmaError::Unauthenticated)?;

    let claims = jwt
        .verify_token(token)
        .claims
        .ok_or(KarmaError::Unauthenticated)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
        name: claims.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_authenticate() {
        let jwt = JwtValidator::new_dev();
        let token = jwt
            .generate_token(TokenInput {
                user_id: "u1".into(),
                email: None,
                name: Some("Member".into()),
            })
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        let user = authenticate(&headers, &jwt).unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.name.as_deref(), Some("Member"));
    }

    #[test]
    fn test_missing_header() {
        let err = authenticate(&HeaderMap::new(), &JwtValidator::new_dev()).unwrap_err();
        assert!(matches!(err, KarmaError::Unauthenticated));
    }
}
