use std::collections::HashMap;
use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};

use crate::error::ApiError;

/// Environment variable listing `token:user` pairs, comma separated
pub const API_TOKENS_ENV: &str = "SENTINEL_API_TOKENS";

/// Bearer tokens accepted by the API and the user each one acts as
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    tokens: HashMap<String, String>,
}

impl TokenTable {
    /// Parse `token:user,token:user`; malformed pairs are skipped
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split(',')
            .filter_map(|pair| {
                let (token, user) = pair.trim().split_once(':')?;
                let (token, user) = (token.trim(), user.trim());
                (!token.is_empty() && !user.is_empty()).then(|| (token.to_string(), user.to_string()))
            })
            .collect();
        Self { tokens }
    }

    pub fn user_for(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The caller, resolved from the `Authorization` header. Accepts the bare
/// token or `Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let tokens = req.app_data::<web::Data<TokenTable>>().ok_or(ApiError::Unauthorized)?;
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    tokens
        .user_for(token)
        .map(|user_id| AuthenticatedUser { user_id: user_id.to_string() })
        .ok_or(ApiError::Unauthorized)
}
