#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    error::{BindListenerSnafu, RollcallResult, ServeSnafu},
    routes::{
        api::{delete_student, get_student, get_students, post_student, put_student},
        dashboard::{
            get_dashboard, internal_delete_student, internal_get_random_student_form,
            internal_get_student_form, internal_get_students, internal_post_student_form,
        },
        import_export::{get_export_csv, get_import_export_page, put_import_students},
        index::get_index_route,
    },
    state::RollcallState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, put},
};
use snafu::ResultExt;
use tokio::{net::TcpListener, signal};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod state;
mod view;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

fn build_router(state: RollcallState) -> Router {
    let students_api = Router::new()
        .route("/students", get(get_students).post(post_student))
        .route(
            "/students/{id}",
            get(get_student).put(put_student).delete(delete_student),
        );

    Router::new()
        .route("/", get(get_index_route))
        .route("/app", get(get_dashboard))
        .route("/dashboard", get(get_dashboard))
        .route("/import_export", get(get_import_export_page))
        .route("/export.csv", get(get_export_csv))
        .route("/internal/students", get(internal_get_students))
        .route("/internal/students/{id}", delete(internal_delete_student))
        .route(
            "/internal/student_form",
            get(internal_get_student_form).post(internal_post_student_form),
        )
        .route(
            "/internal/student_form/random",
            get(internal_get_random_student_form),
        )
        .route("/internal/import", put(put_import_students))
        .merge(students_api.clone())
        .nest("/api", students_api)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            state.config().max_upload_bytes(),
        ))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve(config: RuntimeConfiguration) -> RollcallResult<()> {
    let server_ip = config.server_ip().to_string();
    let state = RollcallState::new(config);
    info!(path = ?state.path(), email_domain = ?state.validator().required_email_domain(), "Using student store");

    let app = build_router(state);
    let listener = TcpListener::bind(&server_ip).await.context(BindListenerSnafu {
        address: &server_ip,
    })?;

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu)
}

#[tokio::main]
async fn main() {
    //before tracing, so RUST_LOG can come from .env
    let dotenv_result = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    match dotenv_result {
        Ok(path) => info!(?path, "Loaded env file"),
        Err(e) if e.not_found() => debug!("No env file found, using process environment"),
        Err(e) => warn!(?e, "Unable to load env file"),
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    if let Err(e) = serve(config).await {
        error!(?e, "Error serving app");
        std::process::exit(1);
    }
}
