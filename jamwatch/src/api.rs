use crate::cache::CameraCache;
use crate::scheduler::RefreshScheduler;
use actix_web::{http::header, web, HttpResponse, Responder};
use log::debug;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppState {
    pub cache: Arc<CameraCache>,
    pub scheduler: Arc<RefreshScheduler>,
    pub result_dir: PathBuf,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/cameras", web::get().to(get_all_cameras))
        .route("/cameras/", web::get().to(get_all_cameras))
        .route("/cameras/{camera_id}", web::get().to(get_camera))
        .route("/status", web::get().to(get_status))
        .route("/refresh", web::post().to(trigger_refresh))
        .route("/images/{file_name}", web::get().to(get_image));
}

async fn get_all_cameras(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.cache.get_all())
}

async fn get_camera(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let camera_id = path.into_inner();
    match state.cache.get(&camera_id) {
        Some(result) => HttpResponse::Ok().json(result),
        None => HttpResponse::NotFound().json(json!({
            "detail": format!("Camera {} not found or not yet processed", camera_id)
        })),
    }
}

async fn get_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.cache.status(state.scheduler.refresh_period()))
}

async fn trigger_refresh(state: web::Data<AppState>) -> impl Responder {
    state.scheduler.request_refresh();

    HttpResponse::Accepted().json(json!({ "status": "refresh scheduled" }))
}

async fn get_image(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let file_name = path.into_inner();
    let valid = file_name.ends_with(".jpg")
        && !file_name.contains(['/', '\\'])
        && !file_name.starts_with('.');
    if !valid {
        return HttpResponse::NotFound().finish();
    }

    match tokio::fs::read(state.result_dir.join(&file_name)).await {
        Ok(bytes) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, "image/jpeg"))
            .body(bytes),
        Err(err) => {
            debug!("Image {} not served: {}", file_name, err);
            HttpResponse::NotFound().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::CongestionResult;
    use crate::pipeline::tests::{square_table, temp_result_dir, FixedDetector, MemorySource};
    use crate::pipeline::CameraPipeline;
    use actix_web::{http::StatusCode, test, App};
    use jamwatch_inference::engine::SharedDetector;
    use jamwatch_inference::inference::null::NullDetector;
    use jamwatch_inference::ImageSize;
    use std::time::Duration;

    fn state(name: &str) -> web::Data<AppState> {
        state_with_detector(name, Arc::new(NullDetector))
    }

    fn state_with_detector(name: &str, detector: SharedDetector) -> web::Data<AppState> {
        let result_dir = temp_result_dir(name);
        let cache = Arc::new(CameraCache::new(Duration::from_secs(5)));
        let pipeline = CameraPipeline::new(
            detector,
            Arc::new(MemorySource::with_cameras(&["A"])),
            ImageSize::new(64, 64),
            result_dir.clone(),
        );
        let scheduler = Arc::new(RefreshScheduler::new(
            cache.clone(),
            pipeline,
            Arc::new(square_table(&["A"])),
            Duration::from_secs(30),
        ));

        web::Data::new(AppState {
            cache,
            scheduler,
            result_dir,
        })
    }

    #[actix_web::test]
    async fn serves_cached_results() {
        let state = state("api-results");
        state.cache.update(CongestionResult::new("A", 42.0));
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let all: Vec<CongestionResult> =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/cameras/").to_request()).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].congestion_percentage, 42.0);

        let one: CongestionResult =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/cameras/A").to_request()).await;
        assert_eq!(one.camera_id, "A");

        let status: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/status").to_request()).await;
        assert_eq!(status["cameras_cached"], 1);
        assert!(status["last_update"].is_string());
    }

    #[actix_web::test]
    async fn unknown_camera_is_not_found() {
        let app = test::init_service(App::new().app_data(state("api-missing")).configure(configure)).await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/cameras/nowhere").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/images/nowhere.jpg").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/images/..jpg").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn manual_refresh_fills_cache() {
        let state = state("api-refresh");
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let response =
            test::call_service(&app, test::TestRequest::post().uri("/refresh").to_request()).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        for _ in 0..100 {
            if state.cache.get("A").is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(state.cache.get("A").unwrap().congestion_percentage, 0.0);

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/images/A.jpg").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn repeated_refresh_requests_are_merged() {
        let detector = Arc::new(FixedDetector::new(Vec::new()));
        let state = state_with_detector("api-flood", detector.clone());
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        for _ in 0..10 {
            let response =
                test::call_service(&app, test::TestRequest::post().uri("/refresh").to_request()).await;
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        for _ in 0..100 {
            if state.cache.get("A").is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(state.cache.get("A").is_some());
        // At most the cycle already running plus one queued behind it.
        assert!(detector.calls() <= 2, "detector ran {} times", detector.calls());
    }
}
