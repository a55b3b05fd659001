#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    dead_code,
    missing_docs,
    clippy::expect_used
)]
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use http::uri::Scheme;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use moov_client::{MoovClient, MoovClientBuilder};

pub const PARTNER_ACCOUNT_ID: &str = "partner-account";
pub const WALLET_ID: &str = "partner-wallet";
pub const CARD_PAYMENT_METHOD_ID: &str = "customer-card";
pub const WALLET_PAYMENT_METHOD_ID: &str = "merchant-wallet";

/// Transfer id answered after two seconds.
pub const SLOW_TRANSFER_ID: &str = "slow";
/// Sweep id answered with a plain text 500.
pub const BROKEN_SWEEP_ID: &str = "broken";
/// Sweep id answered with a body that is not a sweep.
pub const MALFORMED_SWEEP_ID: &str = "malformed";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Query parameters, sorted by name.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(self.query.as_deref().unwrap_or_default())
                .expect("valid query string");
        pairs.sort();
        pairs
    }
}

#[derive(Debug, Default)]
struct Store {
    requests: Vec<RecordedRequest>,
    transfers: Vec<Value>,
    receipts: Vec<Value>,
    sweep_configs: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
struct MockState(Arc<Mutex<Store>>);

impl MockState {
    fn with<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut store = self.0.lock().expect("store lock");
        f(&mut store)
    }
}

/// In-process stand-in for the platform, listening on a random local port.
pub struct MockServer {
    addr: SocketAddr,
    client: MoovClient,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = MockState::default();
        let app = router(state.clone());

        info!(%addr, "launching mock server");
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!(?err, "mock server stopped");
            }
        });

        let client = client_builder_for(addr).build()?;
        Ok(Self {
            addr,
            client,
            state,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn client(&self) -> &MoovClient {
        &self.client
    }

    /// A builder targeting this server, for clients with a custom configuration.
    pub fn client_builder(&self) -> MoovClientBuilder {
        client_builder_for(self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.with(|store| store.requests.clone())
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.state
            .with(|store| store.requests.last().cloned())
            .expect("at least one request")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn client_builder_for(addr: SocketAddr) -> MoovClientBuilder {
    MoovClient::builder()
        .with_scheme(Scheme::HTTP)
        .with_host(addr.ip().to_string())
        .with_port(addr.port())
        .with_credentials("public-key", "secret-key")
}

fn router(state: MockState) -> Router {
    Router::new()
        .route(
            "/accounts/{account_id}/transfers",
            get(list_transfers).post(create_transfer),
        )
        .route(
            "/accounts/{account_id}/transfers/{transfer_id}",
            get(get_transfer),
        )
        .route("/receipts", get(list_receipts).post(create_receipts))
        .route(
            "/accounts/{account_id}/sweep-configs",
            get(list_sweep_configs).post(create_sweep_config),
        )
        .route(
            "/accounts/{account_id}/sweep-configs/{sweep_config_id}",
            get(get_sweep_config).patch(update_sweep_config),
        )
        .route(
            "/accounts/{account_id}/wallets/{wallet_id}/sweeps",
            get(list_sweeps),
        )
        .route(
            "/accounts/{account_id}/wallets/{wallet_id}/sweeps/{sweep_id}",
            get(get_sweep),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        headers: request.headers().clone(),
    };
    state.with(|store| store.requests.push(recorded));
    next.run(request).await
}

fn api_error(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn paginate(items: Vec<Value>, params: &HashMap<String, String>) -> Vec<Value> {
    let skip = params
        .get("skip")
        .and_then(|skip| skip.parse().ok())
        .unwrap_or(0);
    let count = params
        .get("count")
        .and_then(|count| count.parse().ok())
        .unwrap_or(200);
    items.into_iter().skip(skip).take(count).collect()
}

// Transfers

async fn create_transfer(
    State(state): State<MockState>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if account_id != PARTNER_ACCOUNT_ID {
        return api_error(StatusCode::NOT_FOUND, "account not found");
    }
    if !headers.contains_key("x-idempotency-key") {
        return api_error(StatusCode::BAD_REQUEST, "missing X-Idempotency-Key header");
    }
    if body["amount"]["value"].as_i64().unwrap_or_default() <= 0 {
        let error = json!({
            "error": "invalid transfer",
            "code": "validation",
            "details": { "amount.value": "must be greater than 0" }
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response();
    }

    let synchronous = headers
        .get("x-wait-for")
        .is_some_and(|value| value.as_bytes() == b"rail-response");
    let transfer_id = Uuid::new_v4().to_string();
    let created_on = now();
    let status = if synchronous { "completed" } else { "pending" };

    let mut transfer = json!({
        "transferID": transfer_id,
        "createdOn": created_on,
        "status": status,
        "amount": body["amount"],
        "source": {
            "paymentMethodID": body["source"]["paymentMethodID"],
            "paymentMethodType": "card-payment",
        },
        "destination": {
            "paymentMethodID": body["destination"]["paymentMethodID"],
            "paymentMethodType": "moov-wallet",
            "account": { "accountID": PARTNER_ACCOUNT_ID, "displayName": "Partner" },
        },
        "moovFee": 0,
    });
    if synchronous {
        transfer["completedOn"] = json!(created_on);
    }
    if let Some(description) = body.get("description") {
        transfer["description"] = description.clone();
    }
    state.with(|store| store.transfers.push(transfer.clone()));

    if synchronous {
        (StatusCode::CREATED, Json(transfer)).into_response()
    } else {
        let started = json!({
            "transferID": transfer_id,
            "status": "pending",
            "createdOn": created_on,
        });
        (StatusCode::ACCEPTED, Json(started)).into_response()
    }
}

async fn get_transfer(
    State(state): State<MockState>,
    Path((_account_id, transfer_id)): Path<(String, String)>,
) -> Response {
    if transfer_id == SLOW_TRANSFER_ID {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    let found = state.with(|store| {
        store
            .transfers
            .iter()
            .find(|transfer| transfer["transferID"] == transfer_id.as_str())
            .cloned()
    });
    match found {
        Some(transfer) => Json(transfer).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "transfer not found"),
    }
}

async fn list_transfers(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let transfers = state.with(|store| store.transfers.clone());
    let transfers = transfers
        .into_iter()
        .filter(|transfer| {
            params
                .get("status")
                .is_none_or(|status| transfer["status"] == status.as_str())
        })
        .collect();
    Json(paginate(transfers, &params)).into_response()
}

// Receipts

async fn create_receipts(
    State(state): State<MockState>,
    Json(requests): Json<Vec<Value>>,
) -> Response {
    let receipts: Vec<Value> = requests
        .into_iter()
        .map(|request| {
            let mut receipt = json!({
                "receiptID": Uuid::new_v4().to_string(),
                "createdBy": PARTNER_ACCOUNT_ID,
                "kind": request["kind"],
            });
            for field in ["email", "emailAccountID", "forTransferID", "forScheduleID"] {
                if let Some(value) = request.get(field) {
                    receipt[field] = value.clone();
                }
            }
            receipt
        })
        .collect();

    state.with(|store| store.receipts.extend(receipts.iter().cloned()));
    Json(receipts).into_response()
}

async fn list_receipts(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let receipts = state.with(|store| store.receipts.clone());
    let receipts: Vec<Value> = receipts
        .into_iter()
        .filter(|receipt| {
            params
                .get("id")
                .is_none_or(|id| receipt["forTransferID"] == id.as_str())
        })
        .map(|mut receipt| {
            // delivery happens after creation
            let sent = json!([{
                "receiptID": receipt["receiptID"],
                "idempotencyKey": Uuid::new_v4().to_string(),
                "sentOn": now(),
            }]);
            receipt["sentFor"] = sent;
            receipt
        })
        .collect();
    Json(receipts).into_response()
}

// Sweep configs

async fn list_sweep_configs(State(state): State<MockState>) -> Response {
    let configs = state.with(|store| store.sweep_configs.clone());
    Json(configs).into_response()
}

async fn create_sweep_config(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Response {
    if body.get("walletID").and_then(Value::as_str).is_none() {
        return api_error(StatusCode::BAD_REQUEST, "walletID is required");
    }

    let mut config = body;
    config["sweepConfigID"] = json!(Uuid::new_v4().to_string());
    config["createdOn"] = json!(now());
    config["updatedOn"] = json!(now());
    state.with(|store| store.sweep_configs.push(config.clone()));
    Json(config).into_response()
}

async fn get_sweep_config(
    State(state): State<MockState>,
    Path((_account_id, sweep_config_id)): Path<(String, String)>,
) -> Response {
    let found = state.with(|store| {
        store
            .sweep_configs
            .iter()
            .find(|config| config["sweepConfigID"] == sweep_config_id.as_str())
            .cloned()
    });
    match found {
        Some(config) => Json(config).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "sweep config not found"),
    }
}

async fn update_sweep_config(
    State(state): State<MockState>,
    Path((_account_id, sweep_config_id)): Path<(String, String)>,
    Json(patch): Json<Value>,
) -> Response {
    let updated = state.with(|store| {
        let config = store
            .sweep_configs
            .iter_mut()
            .find(|config| config["sweepConfigID"] == sweep_config_id.as_str())?;
        for (field, value) in patch.as_object().into_iter().flatten() {
            config[field.as_str()] = value.clone();
        }
        config["updatedOn"] = json!(now());
        Some(config.clone())
    });
    match updated {
        Some(config) => Json(config).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "sweep config not found"),
    }
}

// Sweeps

fn sweeps() -> Vec<Value> {
    vec![
        json!({
            "sweepID": "swp-accruing",
            "status": "accruing",
            "accrualStartedOn": "2024-05-01T00:00:00Z",
            "accruedAmount": { "currency": "usd", "valueDecimal": "12.50" },
            "statementDescriptor": "ACME",
        }),
        json!({
            "sweepID": "swp-paid",
            "status": "paid",
            "accrualStartedOn": "2024-04-01T00:00:00Z",
            "accrualEndedOn": "2024-04-30T00:00:00Z",
            "accruedAmount": { "currency": "usd", "valueDecimal": "40.00" },
            "residualBalance": { "currency": "usd", "valueDecimal": "0.00" },
            "transferID": "sweep-transfer",
            "transferAmount": "40.00",
            "statementDescriptor": "ACME",
        }),
    ]
}

async fn list_sweeps(
    Path((_account_id, wallet_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if wallet_id != WALLET_ID {
        return Json(Vec::<Value>::new()).into_response();
    }
    let sweeps = sweeps()
        .into_iter()
        .filter(|sweep| {
            params
                .get("status")
                .is_none_or(|status| sweep["status"] == status.as_str())
        })
        .collect();
    Json(paginate(sweeps, &params)).into_response()
}

async fn get_sweep(Path((_account_id, _wallet_id, sweep_id)): Path<(String, String, String)>) -> Response {
    match sweep_id.as_str() {
        BROKEN_SWEEP_ID => (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response(),
        MALFORMED_SWEEP_ID => Json(json!({ "sweepID": 42, "status": "accruing" })).into_response(),
        _ => sweeps()
            .into_iter()
            .find(|sweep| sweep["sweepID"] == sweep_id.as_str())
            .map_or_else(
                || api_error(StatusCode::NOT_FOUND, "sweep not found"),
                |sweep| Json(sweep).into_response(),
            ),
    }
}
