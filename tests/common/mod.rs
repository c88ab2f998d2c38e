use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

/// Canned responses for an in-process stand-in of the DexScreener API.
#[derive(Default)]
pub struct Fixture {
    /// Pair lookups keyed by pair address.
    pub pairs: HashMap<String, PairReply>,
    /// Body of `/token-profiles/latest/v1`.
    pub profiles: Value,
    /// Pools-for-token bodies keyed by token address. Unknown tokens get 404.
    pub pools: HashMap<String, Value>,
    /// Tokens whose pools lookup answers 500.
    pub failing_pools: Vec<String>,
    pub pool_requests: AtomicUsize,
}

pub enum PairReply {
    Json(Value),
    Raw(&'static str),
    Status(u16),
    Delayed(Duration, Value),
}

impl Fixture {
    pub fn pool_requests(&self) -> usize {
        self.pool_requests.load(Ordering::SeqCst)
    }
}

pub fn pair_json(name: &str, symbol: &str, price: &str, fdv: f64, icon: Option<&str>) -> Value {
    let mut base = json!({ "address": "TokenMint", "name": name, "symbol": symbol });
    if let Some(icon) = icon {
        base["iconUrl"] = json!(icon);
    }
    json!({
        "schemaVersion": "1.0.0",
        "pair": {
            "chainId": "solana",
            "dexId": "raydium",
            "pairAddress": "PAIR",
            "baseToken": base,
            "priceUsd": price,
            "fdv": fdv
        }
    })
}

fn status(code: u16) -> Response {
    let code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status("error", code).into_response()
}

async fn pair_lookup(_chain: String, address: String, fixture: Arc<Fixture>) -> Result<Response, Infallible> {
    let reply = match fixture.pairs.get(&address) {
        Some(PairReply::Json(body)) => warp::reply::json(body).into_response(),
        Some(PairReply::Raw(body)) => (*body).into_response(),
        Some(PairReply::Status(code)) => status(*code),
        Some(PairReply::Delayed(delay, body)) => {
            tokio::time::sleep(*delay).await;
            warp::reply::json(body).into_response()
        }
        None => warp::reply::json(&json!({ "schemaVersion": "1.0.0", "pair": null })).into_response(),
    };
    Ok(reply)
}

async fn profiles(fixture: Arc<Fixture>) -> Result<Response, Infallible> {
    Ok(warp::reply::json(&fixture.profiles).into_response())
}

async fn pools(_chain: String, token: String, fixture: Arc<Fixture>) -> Result<Response, Infallible> {
    fixture.pool_requests.fetch_add(1, Ordering::SeqCst);
    if fixture.failing_pools.contains(&token) {
        return Ok(status(500));
    }
    Ok(match fixture.pools.get(&token) {
        Some(body) => warp::reply::json(body).into_response(),
        None => status(404),
    })
}

/// Starts the stand-in API on an ephemeral port and returns its base URL.
pub async fn spawn_mock_api(fixture: Arc<Fixture>) -> String {
    let with_fixture = {
        let fixture = fixture.clone();
        warp::any().map(move || fixture.clone())
    };

    let pair_route = warp::path!("latest" / "dex" / "pairs" / String / String)
        .and(with_fixture.clone())
        .and_then(pair_lookup);
    let profiles_route = warp::path!("token-profiles" / "latest" / "v1")
        .and(with_fixture.clone())
        .and_then(profiles);
    let pools_route = warp::path!("token-pairs" / "v1" / String / String)
        .and(with_fixture)
        .and_then(pools);

    let routes = warp::get().and(pair_route.or(profiles_route).or(pools_route));
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    format!("http://{}", addr)
}
