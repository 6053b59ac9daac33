#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use authgate::auth::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, USER_COOKIE_NAME};
use authgate::{ServerConfig, create_app};
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const IDENTIFIER: &str = "alice@example.com";
pub const SECRET: &str = "hunter2";
pub const TENANT: &str = "acme";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const ROTATED_REFRESH_TOKEN: &str = "refresh-2";
/// Subject whose tokens the downstream API refuses with 401.
pub const REVOKED_SUBJECT: &str = "revoked";

/// Nothing listens here; requests fail at the transport layer.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Mint a signed access token for `sub` expiring at `exp`.
pub fn mint_token(sub: &str, exp: i64) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"identity-test-secret"),
    )
    .expect("Failed to mint token")
}

/// Mint a signed access token whose `exp` claim is a fractional NumericDate.
pub fn mint_token_fractional(sub: &str, exp: f64) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": sub, "exp": exp }),
        &EncodingKey::from_secret(b"identity-test-secret"),
    )
    .expect("Failed to mint token")
}

pub fn user_json() -> Value {
    json!({
        "id": "u-1",
        "email": IDENTIFIER,
        "firstName": "Alice",
        "lastName": "Liddell",
        "tenantId": TENANT,
        "roles": ["admin"],
        "permissions": [1, 2]
    })
}

fn pair_json(token: &str, refresh_token: &str, exp: i64) -> Value {
    let expires = DateTime::from_timestamp(exp, 0).expect("Invalid timestamp");
    json!({
        "token": token,
        "refreshToken": refresh_token,
        "expires": expires.to_rfc3339(),
        "user": user_json()
    })
}

/// In-process identity service and downstream API.
#[derive(Default)]
pub struct StubIdentity {
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub last_refresh_body: Mutex<Option<Value>>,
    pub last_authorization: Mutex<Option<String>>,
}

impl StubIdentity {
    pub fn login_count(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn last_refresh_body(&self) -> Option<Value> {
        self.last_refresh_body.lock().unwrap().clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }
}

async fn stub_login(State(stub): State<Arc<StubIdentity>>, Json(body): Json<Value>) -> Response {
    stub.login_calls.fetch_add(1, Ordering::SeqCst);
    if body["identifier"] == IDENTIFIER && body["secret"] == SECRET && body["tenant"] == TENANT {
        let exp = now() + 3600;
        Json(pair_json(&mint_token("u-1", exp), REFRESH_TOKEN, exp)).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "bad credentials" })),
        )
            .into_response()
    }
}

async fn stub_refresh(State(stub): State<Arc<StubIdentity>>, Json(body): Json<Value>) -> Response {
    stub.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let accepted = body["refreshToken"] == REFRESH_TOKEN;
    *stub.last_refresh_body.lock().unwrap() = Some(body);
    if accepted {
        let exp = now() + 3600;
        Json(pair_json(&mint_token("u-1", exp), ROTATED_REFRESH_TOKEN, exp)).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn stub_me(State(stub): State<Arc<StubIdentity>>, headers: HeaderMap) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *stub.last_authorization.lock().unwrap() = authorization.clone();

    let Some(token) = authorization
        .as_deref()
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match authgate::token::decode(token) {
        Ok(claims) if claims.sub.as_deref() != Some(REVOKED_SUBJECT) => {
            Json(json!({ "id": "u-1", "bio": "Curiouser and curiouser" })).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Start the stub on a random port. Returns its base URL and call counters.
pub async fn start_identity() -> (String, Arc<StubIdentity>) {
    let stub = Arc::new(StubIdentity::default());
    let router = Router::new()
        .route("/auth/login", post(stub_login))
        .route("/auth/refresh", post(stub_refresh))
        .route("/users/me", get(stub_me))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub");
    let addr: SocketAddr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    (format!("http://{}", addr), stub)
}

/// Build the application against the identity service at `api_url`.
pub fn test_app(api_url: &str) -> Router {
    create_app(&ServerConfig {
        api_url: api_url.to_string(),
        secure_cookies: false,
        refresh_max_age: 3600,
    })
}

/// `Cookie` header value carrying the given credentials.
pub fn cookie_header(token: Option<&str>, refresh_token: Option<&str>, user: bool) -> String {
    let mut parts = Vec::new();
    if let Some(token) = token {
        parts.push(format!("{}={}", ACCESS_COOKIE_NAME, token));
    }
    if let Some(refresh_token) = refresh_token {
        parts.push(format!("{}={}", REFRESH_COOKIE_NAME, refresh_token));
    }
    if user {
        let encoded = urlencoding::encode(&user_json().to_string()).into_owned();
        parts.push(format!("{}={}", USER_COOKIE_NAME, encoded));
    }
    parts.join("; ")
}

pub fn get_request(path: &str, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_request(path: &str, cookies: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The `Set-Cookie` value for `name`, if any.
pub fn find_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
}

/// Value of a `Set-Cookie` header, percent-decoded.
pub fn cookie_value(set_cookie: &str) -> String {
    let value = set_cookie
        .split(';')
        .next()
        .and_then(|kv| kv.split_once('='))
        .map(|(_, v)| v)
        .unwrap_or_default();
    urlencoding::decode(value).unwrap().into_owned()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
