use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use clap::{CommandFactory, Parser};
use jobform::modules::events::{apply, FormEvent};
use jobform::modules::markup::parse_form;
use jobform::modules::serialize::{load_form, load_selectors};
use jobform::modules::sources::MarkupSource;
use jobform::modules::submission::Submittable;
use jobform::modules::types::{BlockHandle, FormModel};
use log::info;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::env;
use std::fs::{self, OpenOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct AppState {
    form: Arc<Mutex<FormModel>>,
    log_path: PathBuf,
}

#[derive(Parser)]
#[command(
    name = "jobform_app",
    version,
    about = "Job form composer over HTTP",
    long_about = None
)]
struct Cli {
    #[arg(short = 'l', long = "log-file", required = true)]
    log_file: String,

    #[arg(short = 'm', long = "markup", conflicts_with = "form")]
    markup: Option<String>,

    #[arg(short = 'f', long = "form", default_value = "./form.toml")]
    form: String,

    #[arg(short = 's', long = "selectors")]
    selectors: Option<String>,
}

#[derive(serde::Deserialize)]
struct Selection {
    #[serde(default)]
    container: Option<String>,
    value: String,
}

#[derive(serde::Serialize)]
struct Applied {
    applied: bool,
    form: FormModel,
}

#[tokio::main]
async fn main() {
    if std::env::args_os().len() == 1 {
        let mut cmd = Cli::command();
        cmd.print_long_help().expect("help output failed");
        println!();
        return;
    }

    let cli = Cli::parse();
    WriteLogger::init(
        LevelFilter::Info,
        ConfigBuilder::new().set_time_format_rfc3339().build(),
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .expect("cannot open log file"),
    )
    .expect("logger already set");

    let form = load_model(&cli).await.expect("cannot load job form");
    let state = AppState {
        form: Arc::new(Mutex::new(form)),
        log_path: PathBuf::from(cli.log_file),
    };

    let app = Router::new()
        .route("/api/form", get(get_form))
        .route("/api/submission", get(get_submission))
        .route("/api/filters/:container", post(add_filter))
        .route(
            "/api/filters/:container/:handle",
            axum::routing::delete(remove_filter),
        )
        .route("/api/renumber/:container", post(renumber_filters))
        .route("/api/plugins/:group", put(change_plugin))
        .route("/api/storage/:radio", put(change_storage))
        .route("/api/log", get(get_log))
        .with_state(state);

    let port = env::var("JOBFORM_APP_PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(7878);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("Job form app running on http://{addr}");
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind port");
    axum::serve(listener, app)
        .await
        .expect("server error");
}

async fn load_model(cli: &Cli) -> Result<FormModel, Box<dyn std::error::Error>> {
    match &cli.markup {
        Some(markup) => {
            let selectors = load_selectors(cli.selectors.as_deref())?;
            let html = MarkupSource::parse(markup).load_in_background().await?;
            parse_form(&html, &selectors)
        }
        None => load_form(&cli.form),
    }
}

async fn get_form(State(state): State<AppState>) -> Result<Json<FormModel>, ApiError> {
    let form = state.form.lock().map_err(|_| ApiError::poisoned())?;
    Ok(Json(form.clone()))
}

async fn get_submission(
    State(state): State<AppState>,
) -> Result<Json<Vec<(String, String)>>, ApiError> {
    let form = state.form.lock().map_err(|_| ApiError::poisoned())?;
    Ok(Json(form.submission()))
}

async fn add_filter(
    State(state): State<AppState>,
    Path(container): Path<String>,
) -> Result<Json<Applied>, ApiError> {
    dispatch(&state, FormEvent::AddFilter { container })
}

async fn remove_filter(
    State(state): State<AppState>,
    Path((container, handle)): Path<(String, u64)>,
) -> Result<Json<Applied>, ApiError> {
    dispatch(&state, FormEvent::RemoveFilter {
        container,
        handle: BlockHandle(handle),
    })
}

async fn renumber_filters(
    State(state): State<AppState>,
    Path(container): Path<String>,
) -> Result<Json<Applied>, ApiError> {
    dispatch(&state, FormEvent::Renumber { container })
}

async fn change_plugin(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(payload): Json<Selection>,
) -> Result<Json<Applied>, ApiError> {
    dispatch(&state, FormEvent::ChangePlugin {
        container: payload.container,
        group,
        value: payload.value,
    })
}

async fn change_storage(
    State(state): State<AppState>,
    Path(radio): Path<String>,
    Json(payload): Json<Selection>,
) -> Result<Json<Applied>, ApiError> {
    dispatch(&state, FormEvent::ChangeStorage {
        radio,
        value: payload.value,
    })
}

// Runs the whole event under the lock, so no reader sees a half-renumbered list.
fn dispatch(state: &AppState, event: FormEvent) -> Result<Json<Applied>, ApiError> {
    let mut form = state.form.lock().map_err(|_| ApiError::poisoned())?;
    let applied = apply(&mut form, &event);
    Ok(Json(Applied {
        applied,
        form: form.clone(),
    }))
}

async fn get_log(State(state): State<AppState>) -> Result<String, ApiError> {
    let text = match fs::read_to_string(&state.log_path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(ApiError::internal(err.to_string())),
    };
    Ok(limit_tail(&text, 20000))
}

fn limit_tail(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_string();
    }
    let mut start = text.len() - max_chars;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

#[derive(Debug)]
struct ApiError {
    code: StatusCode,
    message: String,
}

impl ApiError {
    fn poisoned() -> Self {
        Self::internal("form state poisoned".to_string())
    }

    fn internal(message: String) -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.code, self.message).into_response()
    }
}
