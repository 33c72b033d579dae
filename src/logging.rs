use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, info, info_span, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cuidame_config::{LogConfig, LogFormat};

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();
    let span = info_span!("request", request_id = %request_id, method = %method, path = %path);

    async move {
        info!("Incoming request");

        let response = next.run(req).await;
        let status = response.status().as_u16();
        let latency_ms = start.elapsed().as_millis() as u64;

        match status {
            500..=599 => error!(status, latency_ms, "Server error"),
            400..=499 => warn!(status, latency_ms, "Client error"),
            _ => info!(status, latency_ms, "Request completed"),
        }

        response
    }
    .instrument(span)
    .await
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{crate_name}={level},cuidame_auth={level},cuidame_db={level},tower_http=warn,sqlx=warn",
            crate_name = env!("CARGO_CRATE_NAME"),
            level = config.level,
        ))
    })
}

/// Installs the global subscriber.
///
/// Console output is compact or JSON per [`LogConfig::format`]. With `LOG_DIR` set, a daily
/// rolling JSON file is written as well; keep the returned guard alive until shutdown so
/// buffered lines are flushed.
pub fn init_tracing(config: &LogConfig) -> Option<WorkerGuard> {
    let console_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(env_filter(config))
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .with_filter(env_filter(config))
            .boxed(),
    };

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "cuidame.json");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter(config));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
