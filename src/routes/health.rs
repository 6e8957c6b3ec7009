use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::services::providers::Providers;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    services: BTreeMap<&'static str, ServiceStatus>,
    version: &'static str,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: &'static str,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: impl Into<String>) -> Self {
        Self {
            status: "ok",
            details: Some(details.into()),
        }
    }

    fn error(details: impl Into<String>) -> Self {
        Self {
            status: "error",
            details: Some(details.into()),
        }
    }
}

pub async fn health_check(
    client: web::Data<Arc<Client>>,
    providers: web::Data<Providers>,
) -> impl Responder {
    let mut services = BTreeMap::new();
    services.insert("mongodb", check_mongodb(&client).await);
    services.insert(
        "google_maps",
        key_status("GOOGLE_MAPS_API_KEY", providers.google_maps.is_some()),
    );
    services.insert(
        "mapbox",
        key_status("MAPBOX_API_KEY", providers.mapbox.is_some()),
    );
    services.insert(
        "gemini",
        key_status("GEMINI_API_KEY", providers.gemini.is_some()),
    );

    let status = if services.values().all(|s| s.status == "ok") {
        "ok"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthStatus {
        status,
        services,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn check_mongodb(client: &Client) -> ServiceStatus {
    match client.database("admin").run_command(doc! {"ping": 1}).await {
        Ok(_) => ServiceStatus::ok("Connected successfully to MongoDB"),
        Err(e) => {
            log::error!("MongoDB health check failed: {}", e);
            ServiceStatus::error("Failed to reach MongoDB")
        }
    }
}

fn key_status(variable: &str, configured: bool) -> ServiceStatus {
    if configured {
        ServiceStatus::ok(format!("{} configured", variable))
    } else {
        ServiceStatus::error(format!("{} not configured", variable))
    }
}
