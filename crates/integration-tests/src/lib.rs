//! Integration test harness for the Bazaar storefront client.
//!
//! [`StubBackend`] is an in-process stand-in for the backend REST service:
//! an axum router on an ephemeral `127.0.0.1` port with just enough behavior
//! (cookie sessions, bearer tokens, roles, stock, orders) to drive the
//! client end to end. Tests point an `AppContext` at it through
//! [`StubBackend::context`].
//!
//! Payload shapes deliberately follow the real backend's quirks: roles are
//! `"User"`/`"Admin"`, identities carry `username`, and product stock is
//! reported under `quantity`.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use bazaar_storefront::cart::CartStore;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::state::AppContext;

const SESSION_COOKIE: &str = "sid";

/// A registered account in the stub.
#[derive(Debug, Clone)]
pub struct StubUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    /// Backend spelling, e.g. `"User"`, `"Admin"`, `"moderator"`.
    pub role: String,
}

impl StubUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "role": self.role,
        })
    }
}

/// Mutable backend state; tests may inspect or seed it.
#[derive(Debug, Default)]
pub struct StubState {
    pub users: Vec<StubUser>,
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub orders: Vec<Value>,
    sessions: HashMap<String, i32>,
    tokens: HashMap<String, i32>,
    next_id: i32,
    /// Number of `GET /api/products` requests served.
    pub product_requests: usize,
}

impl StubState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i32) -> Option<&StubUser> {
        self.users.iter().find(|u| u.id == id)
    }

    fn caller(&self, headers: &HeaderMap) -> Option<&StubUser> {
        let from_token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token));

        let from_cookie = session_id(headers).and_then(|sid| self.sessions.get(&sid));

        from_token.or(from_cookie).and_then(|id| self.user(*id))
    }
}

/// Running stub backend.
pub struct StubBackend {
    pub base_url: String,
    state: Arc<Mutex<StubState>>,
    handle: JoinHandle<()>,
}

impl StubBackend {
    /// Start a backend seeded with a customer, an administrator, two
    /// categories, and three products.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(seed()));
        let app = router(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("Stub backend has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Stub backend crashed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    /// Lock the backend state.
    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Client context pointed at this backend.
    pub fn context(&self, store: impl CartStore + 'static) -> AppContext {
        context_for(&self.base_url, store)
    }

    /// Stop serving; later requests fail to connect.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client context for an arbitrary backend URL.
pub fn context_for(base_url: &str, store: impl CartStore + 'static) -> AppContext {
    let base_url = base_url.to_string();
    let config = StorefrontConfig::from_lookup(|key| match key {
        "BAZAAR_API_URL" => Some(base_url.clone()),
        "BAZAAR_REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .expect("Test configuration is valid");

    AppContext::with_store(config, store).expect("Failed to build client context")
}

/// A URL on which nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Probe port has no address");
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// Seed data
// =============================================================================

pub const CUSTOMER_EMAIL: &str = "user@example.com";
pub const CUSTOMER_PASSWORD: &str = "customer-pw";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-pw";

/// Seeded product ids.
pub const KETTLE_ID: i32 = 101;
pub const TEAPOT_ID: i32 = 102;
pub const SOLD_OUT_ID: i32 = 103;

fn seed() -> StubState {
    StubState {
        users: vec![
            StubUser {
                id: 1,
                username: "amna".to_string(),
                email: CUSTOMER_EMAIL.to_string(),
                password: CUSTOMER_PASSWORD.to_string(),
                role: "User".to_string(),
            },
            StubUser {
                id: 2,
                username: "root".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role: "Admin".to_string(),
            },
        ],
        categories: vec![
            json!({"id": 1, "name": "Kitchen", "subcategories": [{"id": 10, "name": "Kettles"}]}),
            json!({"id": 2, "name": "Garden", "subcategories": []}),
        ],
        products: vec![
            json!({
                "id": KETTLE_ID, "name": "Kettle", "description": "Steel, whistles",
                "price": 500, "category_id": 1, "subcategory_id": 10,
                "category": "Kitchen", "quantity": 2, "stock_status": "in_stock",
                "image_url": "https://cdn.example.com/kettle.png"
            }),
            json!({
                "id": TEAPOT_ID, "name": "Teapot", "description": "Ceramic",
                "price": "1250.50", "category_id": 1, "category": "Kitchen",
                "quantity_in_stock": 10
            }),
            json!({
                "id": SOLD_OUT_ID, "name": "Hose", "description": "20m garden hose",
                "price": 900, "category_id": 2, "category": "Garden",
                "quantity": 0, "stock_status": "out_of_stock"
            }),
        ],
        next_id: 1_000,
        ..StubState::default()
    }
}

// =============================================================================
// Router
// =============================================================================

type Shared = Arc<Mutex<StubState>>;

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/{id}/subcategories", post(create_subcategory))
        .route("/api/orders", post(submit_order))
        .route("/api/user/orders", get(my_orders))
        .route("/api/admin/orders", get(all_orders))
        .route("/api/admin/orders/{id}/status", put(update_status))
        .route("/api/trackorder/{id}", get(track))
        .with_state(state)
}

fn lock(state: &Shared) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Not authenticated")
}

fn forbidden() -> Response {
    error(StatusCode::FORBIDDEN, "Admin access required")
}

fn is_admin(user: &StubUser) -> bool {
    user.role.eq_ignore_ascii_case("admin") || user.role.eq_ignore_ascii_case("moderator")
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match state.caller(&headers) {
        Some(user) => Json(user.to_json()).into_response(),
        None => unauthorized(),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    identifier: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut state = lock(&state);
    let Some(user) = state
        .users
        .iter()
        .find(|u| {
            (u.email == body.identifier || u.username == body.identifier)
                && u.password == body.password
        })
        .cloned()
    else {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    let sid = format!("session-{}", state.next_id());
    state.sessions.insert(sid.clone(), user.id);

    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly"))],
        Json(json!({ "message": "Logged in", "user": user.to_json() })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = lock(&state);
    if state.users.iter().any(|u| u.email == body.email) {
        return error(StatusCode::CONFLICT, "Email already registered");
    }

    let user = StubUser {
        id: state.next_id(),
        username: body.name,
        email: body.email,
        password: body.password,
        role: "User".to_string(),
    };
    let token = format!("token-{}", user.id);
    state.tokens.insert(token.clone(), user.id);
    state.users.push(user.clone());

    (
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user.to_json() })),
    )
        .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Some(sid) = session_id(&headers) {
        state.sessions.remove(&sid);
    }

    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"))],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct ProductFilter {
    category: Option<String>,
    subcategory: Option<String>,
}

async fn list_products(State(state): State<Shared>, Query(filter): Query<ProductFilter>) -> Response {
    let mut state = lock(&state);
    state.product_requests += 1;

    let subcategory_name = filter.subcategory.as_ref().and_then(|name| {
        state
            .categories
            .iter()
            .flat_map(|c| c["subcategories"].as_array().cloned().unwrap_or_default())
            .find(|s| s["name"] == name.as_str())
            .map(|s| s["id"].clone())
    });

    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| {
            filter
                .category
                .as_ref()
                .is_none_or(|name| p["category"] == name.as_str())
        })
        .filter(|p| {
            filter.subcategory.is_none()
                || subcategory_name
                    .as_ref()
                    .is_some_and(|id| &p["subcategory_id"] == id)
        })
        .cloned()
        .collect();

    Json(products).into_response()
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    match state.caller(&headers) {
        Some(user) if is_admin(user) => {}
        Some(_) => return forbidden(),
        None => return unauthorized(),
    }

    body["id"] = json!(state.next_id());
    state.products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn list_categories(State(state): State<Shared>) -> Response {
    Json(lock(&state).categories.clone()).into_response()
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    match state.caller(&headers) {
        Some(user) if is_admin(user) => {}
        Some(_) => return forbidden(),
        None => return unauthorized(),
    }

    let category = json!({ "id": state.next_id(), "name": body["name"], "subcategories": [] });
    state.categories.push(category.clone());
    (StatusCode::CREATED, Json(category)).into_response()
}

async fn create_subcategory(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(category_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    match state.caller(&headers) {
        Some(user) if is_admin(user) => {}
        Some(_) => return forbidden(),
        None => return unauthorized(),
    }

    let subcategory = json!({ "id": state.next_id(), "name": body["name"] });
    let Some(category) = state
        .categories
        .iter_mut()
        .find(|c| c["id"] == category_id)
    else {
        return error(StatusCode::NOT_FOUND, "Category not found");
    };

    if let Some(subs) = category["subcategories"].as_array_mut() {
        subs.push(subcategory.clone());
    }
    (StatusCode::CREATED, Json(subcategory)).into_response()
}

async fn submit_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let caller = state.caller(&headers).map(|u| u.id);

    if body["items"].as_array().is_none_or(Vec::is_empty) {
        return error(StatusCode::BAD_REQUEST, "Order has no items");
    }

    let id = state.next_id();
    let tracking_id = format!("TRK-{id}");
    let order = json!({
        "id": id,
        "tracking_id": tracking_id,
        "status": "pending",
        "name": body["name"],
        "address": body["address"],
        "phone": body["phone"],
        "user_id": body["user_id"].as_i64().or(caller.map(i64::from)),
        "total_amount": body["total_amount"],
        "created_at": "2026-03-01T10:30:00Z",
        "items": body["items"],
    });
    state.orders.push(order);

    (
        StatusCode::CREATED,
        Json(json!({ "order_id": id, "tracking_id": tracking_id })),
    )
        .into_response()
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let Some(user) = state.caller(&headers) else {
        return unauthorized();
    };

    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o["user_id"] == user.id)
        .cloned()
        .collect();
    Json(orders).into_response()
}

async fn all_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match state.caller(&headers) {
        Some(user) if is_admin(user) => Json(state.orders.clone()).into_response(),
        Some(_) => forbidden(),
        None => unauthorized(),
    }
}

async fn update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    match state.caller(&headers) {
        Some(user) if is_admin(user) => {}
        Some(_) => return forbidden(),
        None => return unauthorized(),
    }

    let Some(order) = state.orders.iter_mut().find(|o| o["id"] == order_id) else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };
    order["status"] = body["status"].clone();
    Json(order.clone()).into_response()
}

async fn track(State(state): State<Shared>, Path(tracking_id): Path<String>) -> Response {
    let state = lock(&state);
    state
        .orders
        .iter()
        .find(|o| o["tracking_id"] == tracking_id.as_str())
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Order not found"),
            |o| {
                Json(json!({
                    "order_id": o["id"],
                    "date": o["created_at"],
                    "status": o["status"],
                }))
                .into_response()
            },
        )
}
