//! Actix Web surface: static pages, the MJPEG feed, camera control and status
//! endpoints.

use std::sync::Arc;

use actix_web::{
    App, HttpResponse, HttpServer,
    http::header,
    rt::time::{interval, sleep},
    web::{self, Bytes},
};
use anyhow::{Context, Result, anyhow};
use async_stream::stream;
use ml_core::CascadeLoader;
use tracing::{error, info, warn};
use video_ingest::system_opener;

use crate::{
    html,
    vision::{
        config::ServerConfig,
        encoding::{encode_jpeg, frame_chunk, stream_content_type},
        state::AppState,
        telemetry,
    },
};

/// Build the state, load the detector unless lazy, and serve until shutdown.
pub fn serve(config: ServerConfig) -> Result<()> {
    let loader = Arc::new(CascadeLoader::new(config.resolver.clone(), config.detector));
    let state = Arc::new(AppState::new(config.pipeline.clone(), loader, system_opener())?);

    if config.lazy_detector {
        info!("Detector loading deferred until the camera is started");
    } else {
        state
            .init_detector_blocking()
            .context("Failed to initialize face detector")?;
    }

    let _ = telemetry::init_metrics_recorder();

    let host = config.host.clone();
    let port = config.port;
    info!("Serving on http://{host}:{port} (live detection at /detection)");

    let data = web::Data::from(state.clone());
    actix_web::rt::System::new()
        .block_on(async move {
            let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
                .bind((host.as_str(), port))?
                .run();
            let result = server.await;
            // Release the camera if the server goes down while capturing.
            state.stop().await;
            result
        })
        .map_err(|err| anyhow!("HTTP server error: {err}"))
}

/// Route table shared by the server and the handler tests.
pub(crate) fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home_route))
        .route("/about", web::get().to(about_route))
        .route("/contact", web::get().to(contact_route))
        .route("/detection", web::get().to(detection_route))
        .route("/static/js/script.js", web::get().to(script_route))
        .route("/video_feed", web::get().to(video_feed))
        .route("/start_camera", web::post().to(start_camera))
        .route("/stop_camera", web::post().to(stop_camera))
        .route("/get_face_count", web::get().to(get_face_count))
        .route("/api/health", web::get().to(health))
        .route("/api/camera_status", web::get().to(camera_status))
        .route("/metrics", web::get().to(metrics_route));
}

fn html_page(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

async fn home_route() -> HttpResponse {
    html_page(html::HOME_HTML)
}

async fn about_route() -> HttpResponse {
    html_page(html::ABOUT_HTML)
}

async fn contact_route() -> HttpResponse {
    html_page(html::CONTACT_HTML)
}

async fn detection_route() -> HttpResponse {
    html_page(html::DETECTION_HTML)
}

async fn script_route() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(html::SCRIPT_JS)
}

/// Stream annotated frames while the camera is active. A connection opened
/// while stopped receives a single placeholder part.
async fn video_feed(state: web::Data<AppState>) -> HttpResponse {
    let state = state.into_inner();
    let stream = stream! {
        if !state.is_active() {
            yield Ok::<Bytes, actix_web::Error>(state.placeholder_chunk());
            return;
        }

        let settings = state.settings().clone();
        let mut ticker = interval(settings.stream_interval);
        let mut last: Option<(u64, Bytes)> = None;
        while state.is_active() {
            let Some(packet) = state.latest_frame() else {
                yield Ok(state.placeholder_chunk());
                sleep(settings.placeholder_interval).await;
                continue;
            };
            ticker.tick().await;

            if let Some((number, chunk)) = &last {
                if *number == packet.frame_number {
                    yield Ok(chunk.clone());
                    continue;
                }
            }

            let number = packet.frame_number;
            let captured_at = packet.timestamp_ms;
            let quality = settings.jpeg_quality;
            match web::block(move || encode_jpeg(&packet.image, quality)).await {
                Ok(Ok(jpeg)) => {
                    let chunk = frame_chunk(&jpeg, number, captured_at);
                    last = Some((number, chunk.clone()));
                    yield Ok(chunk);
                }
                Ok(Err(err)) => warn!("Dropping frame {number}: {err:#}"),
                Err(err) => {
                    error!("Encode task failed: {err}");
                    break;
                }
            }
        }
    };

    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET"))
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .append_header((header::CONTENT_TYPE, stream_content_type()))
        .streaming(stream)
}

async fn start_camera(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.into_inner().start().await)
}

async fn stop_camera(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.into_inner().stop().await)
}

async fn get_face_count(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.into_inner().face_count().await)
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.health())
}

async fn camera_status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.status())
}

async fn metrics_route() -> HttpResponse {
    match telemetry::prometheus_handle() {
        Some(handle) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(handle.render()),
        None => HttpResponse::NoContent().finish(),
    }
}
