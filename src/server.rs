//! HTTP API over the rate resolver.

use crate::core::convert;
use crate::core::resolver::RateResolver;
use actix_web::{App, HttpResponse, HttpServer, web};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct RateResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub local: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    usd: Option<String>,
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: message.into(),
    })
}

/// `GET /api/currency`. Always answers 200.
#[instrument(name = "GetRate", skip_all)]
async fn get_rate(resolver: web::Data<RateResolver>) -> HttpResponse {
    let rate = resolver.get_rate().await;
    HttpResponse::Ok().json(RateResponse { rate })
}

/// `GET /api/currency/convert?usd=<amount>`
#[instrument(name = "ConvertPrice", skip_all)]
async fn convert_price(
    resolver: web::Data<RateResolver>,
    query: web::Query<ConvertQuery>,
) -> HttpResponse {
    let Some(raw) = query.usd.as_deref() else {
        return bad_request("Missing 'usd' query parameter");
    };
    let Ok(usd) = Decimal::from_str(raw.trim()) else {
        return bad_request(format!("Invalid USD amount: {raw}"));
    };
    if let Err(e) = convert::validate_usd(usd) {
        return bad_request(e.to_string());
    }

    let rate = resolver.get_rate().await;
    match convert::to_local(usd, rate) {
        Ok(local) => HttpResponse::Ok().json(ConversionResponse { usd, rate, local }),
        Err(e) => {
            warn!(error = %e, "Rejected conversion request");
            bad_request(e.to_string())
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/currency").route(web::get().to(get_rate)))
        .service(web::resource("/api/currency/convert").route(web::get().to(convert_price)));
}

pub async fn serve(bind: &str, resolver: RateResolver) -> Result<()> {
    let resolver = web::Data::new(resolver);

    let server = HttpServer::new(move || App::new().app_data(resolver.clone()).configure(routes))
        .bind(bind)
        .with_context(|| format!("Failed to bind {bind}"))?;

    info!("Serving exchange rates on http://{bind}");
    server.run().await.context("HTTP server failed")
}
