use crate::{
    access::{
        fields::{normalize_email, trimmed},
        ResourceKind, Schema,
    },
    config::Config,
    database::EntityStore,
    error::{AppError, StoreError},
    state::AppState,
};
use actix_service::{self, Transform};
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, HttpMessage, HttpRequest,
};
use chrono::Utc;
use futures::{
    future::{ready, LocalBoxFuture, Ready},
    FutureExt,
};
use jsonwebtoken::{self, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, from_document, oid::ObjectId, to_document, DateTime};
use pwhash::bcrypt;
use serde::{Deserialize, Serialize};
use std::{rc::Rc, str::FromStr};
use tracing::{debug, warn};

const ISSUER: &str = "sitesafe";
const AUDIENCE: &str = "sitesafe-api";
const MIN_PASSWORD_LEN: usize = 8;

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::User,
    label: "User",
    collection: "users",
    required: &["name", "email", "password"],
    choices: &[],
    sort: &[],
    owner: None,
    unique: &["email"],
    references: &[],
    name_fields: &["name"],
};

#[derive(Debug, Serialize, Deserialize)]
struct UserClaims {
    aud: String,
    exp: i64,
    iss: String,
    sub: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct UserCredential {
    pub email: String,
    pub password: String,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct UserResponse {
    pub _id: String,
    pub name: String,
    pub email: String,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct UserSession {
    pub _id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}
/// The authenticated caller, attached to the request by the middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub _id: ObjectId,
    pub name: String,
    pub email: String,
}
pub struct UserAuthenticationMiddleware<S> {
    service: Rc<S>,
}
pub struct UserAuthenticationMiddlewareFactory;

pub type UserAuthentication = Rc<Principal>;

impl User {
    pub fn from_request(payload: UserRequest) -> Result<Self, AppError> {
        let name = trimmed(payload.name);
        if name.is_empty() {
            return Err(AppError::missing_fields(&["name"]));
        }
        if payload.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        Ok(Self {
            _id: None,
            name,
            email: normalize_email("email", &payload.email)?,
            password: payload.password,
            created_at: None,
        })
    }
    pub async fn save(&mut self, store: &dyn EntityStore) -> Result<ObjectId, AppError> {
        if Self::find_by_email(store, &self.email).await?.is_some() {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        self.password = bcrypt::hash(&self.password)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
        self.created_at = Some(DateTime::now());

        let document = to_document(self).map_err(StoreError::from)?;
        let _id = store.insert_one(SCHEMA.collection, document).await?;
        self._id = Some(_id);
        Ok(_id)
    }
    pub async fn find_by_id(
        store: &dyn EntityStore,
        _id: &ObjectId,
    ) -> Result<Option<User>, StoreError> {
        match store.find_one(SCHEMA.collection, doc! { "_id": _id }).await? {
            Some(document) => Ok(Some(from_document::<User>(document)?)),
            None => Ok(None),
        }
    }
    pub async fn find_by_email(
        store: &dyn EntityStore,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let email = email.trim().to_lowercase();
        match store
            .find_one(SCHEMA.collection, doc! { "email": email })
            .await?
        {
            Some(document) => Ok(Some(from_document::<User>(document)?)),
            None => Ok(None),
        }
    }
    pub fn session(&self, token: String) -> Result<UserSession, AppError> {
        let _id = self
            ._id
            .ok_or_else(|| AppError::Internal("user has no id".to_string()))?;
        Ok(UserSession {
            _id: _id.to_hex(),
            name: self.name.clone(),
            email: self.email.clone(),
            token,
        })
    }
}

impl From<&Principal> for UserResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            _id: principal._id.to_hex(),
            name: principal.name.clone(),
            email: principal.email.clone(),
        }
    }
}

impl UserCredential {
    pub async fn authenticate(&self, state: &AppState) -> Result<UserSession, AppError> {
        let user = User::find_by_email(state.store.as_ref(), &self.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !bcrypt::verify(&self.password, &user.password) {
            return Err(AppError::InvalidCredentials);
        }
        let _id = user
            ._id
            .ok_or_else(|| AppError::Internal("user has no id".to_string()))?;
        user.session(Self::issue(&state.config, &_id)?)
    }
    pub fn issue(config: &Config, _id: &ObjectId) -> Result<String, AppError> {
        let claims: UserClaims = UserClaims {
            sub: _id.to_hex(),
            exp: Utc::now().timestamp() + config.token_ttl_secs,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token generation failed: {e}")))
    }
    pub fn verify(config: &Config, token: &str) -> Option<ObjectId> {
        let mut validation: Validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);

        let data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| debug!(error = %e, "rejected token"))
        .ok()?;
        ObjectId::from_str(&data.claims.sub).ok()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn principal_for(state: &AppState, token: &str) -> Option<Principal> {
    let _id = UserCredential::verify(&state.config, token)?;
    match User::find_by_id(state.store.as_ref(), &_id).await {
        Ok(Some(user)) => Some(Principal {
            _id,
            name: user.name,
            email: user.email,
        }),
        Ok(None) => None,
        Err(error) => {
            warn!(%error, "could not load token subject");
            None
        }
    }
}

/// The caller attached by [`UserAuthenticationMiddleware`], or 401.
pub fn authenticated(req: &HttpRequest) -> Result<UserAuthentication, AppError> {
    req.extensions()
        .get::<UserAuthentication>()
        .cloned()
        .ok_or(AppError::Unauthenticated)
}

impl<S, B> Service<ServiceRequest> for UserAuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv: Rc<S> = self.service.clone();

        async move {
            let state = req.app_data::<web::Data<AppState>>().cloned();
            if let (Some(state), Some(token)) = (state, bearer_token(req.headers())) {
                if let Some(principal) = principal_for(&state, &token).await {
                    req.extensions_mut()
                        .insert::<UserAuthentication>(Rc::new(principal));
                }
            }
            let res: ServiceResponse<B> = srv.call(req).await?;
            Ok(res)
        }
        .boxed_local()
    }
}
impl<S, B> Transform<S, ServiceRequest> for UserAuthenticationMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = UserAuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UserAuthenticationMiddleware {
            service: Rc::new(service),
        }))
    }
}
