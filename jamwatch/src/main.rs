#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod api;
mod cache;
mod config;
mod detect;
mod pipeline;
mod roi;
mod scheduler;

use crate::api::AppState;
use crate::cache::CameraCache;
use crate::config::Config;
use crate::pipeline::CameraPipeline;
use crate::roi::RoiTable;
use crate::scheduler::RefreshScheduler;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use jamwatch_media::image::util::draw::load_font;
use log::info;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub(crate) fn log_init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Also bridges `log` records into the subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[actix_web::main]
async fn main() -> Result<()> {
    log_init();
    let config = Config::parse();

    let table = Arc::new(RoiTable::load(&config.roi_table)?);
    std::fs::create_dir_all(&config.result_dir).with_context(|| {
        format!(
            "Failed to create result directory {}",
            config.result_dir.display()
        )
    })?;

    let detector = config.detector_backend().build()?;
    let mut pipeline = CameraPipeline::new(
        detector,
        config.image_source()?,
        config.image_size(),
        config.result_dir.clone(),
    );
    if let Some(path) = &config.label_font {
        pipeline = pipeline.with_label_font(load_font(path)?);
        info!("Labelling rendered frames with font {}", path.display());
    }

    let cache = Arc::new(CameraCache::new(config.stale_after()));
    let scheduler = Arc::new(RefreshScheduler::new(
        cache.clone(),
        pipeline,
        table,
        config.refresh_period(),
    ));
    scheduler.spawn();

    let state = web::Data::new(AppState {
        cache,
        scheduler,
        result_dir: config.result_dir.clone(),
    });

    info!("Serving on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
