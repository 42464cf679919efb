use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::config::live::LiveConfig;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub table_version: u64,
    pub route_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteStatus {
    pub method: String,
    pub path: String,
    pub service: String,
    pub response_file: String,
    /// Whether the response file exists right now.
    pub available: bool,
}

pub async fn get_status(State(live): State<LiveConfig>) -> Json<SystemStatus> {
    let table = live.read();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        table_version: table.version(),
        route_count: table.len(),
    })
}

pub async fn get_routes(State(live): State<LiveConfig>) -> Json<Vec<RouteStatus>> {
    let table = live.read();
    let mut routes = Vec::with_capacity(table.len());
    for entry in table.entries() {
        let available = tokio::fs::metadata(entry.response_file())
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        routes.push(RouteStatus {
            method: entry.key().verb.to_string(),
            path: entry.key().path.clone(),
            service: entry.service().to_string(),
            response_file: entry.response_file().display().to_string(),
            available,
        });
    }
    Json(routes)
}
