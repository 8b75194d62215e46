//! REST API server for the cash flow valuation wizard
//!
//! Exposes sample data, spreadsheet upload, template download and report
//! export over HTTP for the frontend UI.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ValuationError;
use crate::ingest::{self, UploadKind};
use crate::models::{ApiResponse, ErrorBody, MonthlyRecord, Multiple, ValuationSummary};
use crate::report;
use crate::sample;
use crate::valuation::{compute_valuation, horizon_mismatch};

const FALLBACK_COMPANY_NAME: &str = "Uploaded Company";

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<AppConfig>,
}

impl ApiState {
    fn reject(&self, err: ValuationError) -> ApiError {
        ApiError {
            inner: err,
            expose_details: self.config.is_development(),
        }
    }
}

/// =============================
/// Error Envelope
/// =============================

/// A failed request, rendered as `{ error, message? }`.
#[derive(Debug)]
pub struct ApiError {
    inner: ValuationError,
    expose_details: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.inner.status_code();

        let body = if status.is_server_error() {
            error!(error = %self.inner, "Request failed");
            let message = if self.expose_details {
                self.inner.to_string()
            } else {
                "Something went wrong".to_string()
            };
            ErrorBody {
                error: self.inner.public_label().to_string(),
                message: Some(message),
            }
        } else {
            warn!(status = status.as_u16(), error = %self.inner, "Request rejected");
            let error = match &self.inner {
                ValuationError::NotFound(_) => self.inner.public_label().to_string(),
                other => other.to_string(),
            };
            ErrorBody { error, message: None }
        };

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "Cash Flow Valuation API is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Sample Data Endpoint
/// =============================

async fn sample_data(State(state): State<ApiState>) -> Json<ApiResponse<ValuationSummary>> {
    let summary = sample::sample_summary(
        &mut rand::thread_rng(),
        state.config.multiple,
        state.config.horizon,
    );
    info!(dcf_valuation = summary.dcf_valuation, "Sample data generated");
    Json(ApiResponse::success(summary, "Sample data generated successfully"))
}

/// =============================
/// Upload Endpoint
/// =============================

struct UploadedFile {
    kind: UploadKind,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> ValuationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValuationError::Validation(ingest::too_large_message(max_bytes))
    } else {
        ValuationError::Validation(format!("Malformed upload: {}", err.body_text()))
    }
}

async fn read_upload(
    mut multipart: Multipart,
    max_bytes: usize,
) -> crate::Result<(Option<UploadedFile>, Option<String>)> {
    let mut file = None;
    let mut company_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let kind = ingest::validate_content_type(field.content_type())?;
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
                ingest::validate_size(bytes.len(), max_bytes)?;
                file = Some(UploadedFile {
                    kind,
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("companyName") => {
                let text = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    company_name = Some(trimmed.to_string());
                }
            }
            _ => {}
        }
    }

    Ok((file, company_name))
}

fn company_from_file_name(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_COMPANY_NAME)
        .to_string()
}

async fn upload(
    State(state): State<ApiState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<ValuationSummary>>> {
    let config = Arc::clone(&state.config);
    let upload_id = Uuid::new_v4();

    let multipart = multipart
        .map_err(|_| state.reject(ValuationError::Validation("No file uploaded".into())))?;

    let (file, company_name) = read_upload(multipart, config.max_upload_bytes)
        .await
        .map_err(|e| state.reject(e))?;

    let file = file.ok_or_else(|| state.reject(ValuationError::Validation("No file uploaded".into())))?;

    info!(
        %upload_id,
        kind = %file.kind,
        size = file.bytes.len(),
        sha256 = %hex::encode(Sha256::digest(&file.bytes)),
        "Upload received"
    );

    let company_name =
        company_name.unwrap_or_else(|| company_from_file_name(file.file_name.as_deref()));

    let kind = file.kind;
    let bytes = file.bytes;
    let outcome = tokio::task::spawn_blocking(move || ingest::extract_records(kind, &bytes))
        .await
        .map_err(|e| state.reject(ValuationError::Processing(format!("Extraction task failed: {}", e))))?;

    let months = outcome.into_result().map_err(|e| state.reject(e))?;

    if let Some(mismatch) = horizon_mismatch(&months, config.horizon) {
        if config.strict_horizon {
            return Err(state.reject(ValuationError::Validation(format!(
                "Expected {} monthly rows, found {}",
                mismatch.expected, mismatch.found
            ))));
        }
        warn!(
            %upload_id,
            expected = mismatch.expected,
            found = mismatch.found,
            "Row count differs from valuation horizon; average still uses the horizon"
        );
    }

    let summary = compute_valuation(company_name, &months, config.multiple, config.horizon);

    info!(
        %upload_id,
        periods = summary.months.len(),
        dcf_valuation = summary.dcf_valuation,
        "Upload processed"
    );

    Ok(Json(ApiResponse::success(summary, "File processed successfully")))
}

/// =============================
/// Template Download
/// =============================

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("xlsx") => ingest::XLSX_MIME,
        Some("xls") => ingest::XLS_MIME,
        Some("csv") => ingest::CSV_MIME,
        _ => "application/octet-stream",
    }
}

async fn download_template(State(state): State<ApiState>) -> ApiResult<Response> {
    let path = state.config.template_path.clone();

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        state.reject(ValuationError::Template(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Cash_Flow_Template.xlsx")
        .to_string();

    info!(template = %path.display(), size = bytes.len(), "Serving template");

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// =============================
/// Report Export
/// =============================

async fn export_report(
    State(state): State<ApiState>,
    body: std::result::Result<Json<ValuationSummary>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(submitted) = body.map_err(|e| {
        state.reject(ValuationError::Validation(format!("Invalid report payload: {}", e.body_text())))
    })?;

    let multiple = Multiple::new(submitted.multiple).map_err(|e| state.reject(e))?;

    // Recompute from the monthly rows so the document never shows figures
    // that disagree with each other.
    let mut months: Vec<MonthlyRecord> = Vec::with_capacity(submitted.months.len());
    for m in submitted.months {
        for (field, value) in [("revenue", m.revenue), ("expenses", m.expenses)] {
            if let Some(problem) = ingest::amount_problem(value, field) {
                return Err(state.reject(ValuationError::Validation(format!(
                    "{} for month '{}'",
                    problem, m.label
                ))));
            }
        }
        months.push(MonthlyRecord::new(m.label, m.revenue, m.expenses));
    }
    let summary = compute_valuation(submitted.company_name, &months, multiple, state.config.horizon);

    let today = chrono::Utc::now().date_naive();
    let html = report::render_report_html(&summary, state.config.horizon, today);
    let file_name = report::report_filename(&summary.company_name, today);

    info!(company = %summary.company_name, bytes = html.len(), "Report exported");

    Ok((
        [
            (header::CONTENT_TYPE, report::REPORT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name.replace('"', "_")),
            ),
        ],
        html,
    )
        .into_response())
}

/// =============================
/// Fallback
/// =============================

async fn not_found(State(state): State<ApiState>, uri: axum::http::Uri) -> ApiError {
    state.reject(ValuationError::NotFound(uri.path().to_string()))
}

/// =============================
/// Router
/// =============================

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            // a wildcard next to allow_credentials makes tower-http panic
            Ok(value) if value != "*" => Some(value),
            _ => {
                warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Baseline hardening headers, added only when a handler has not set them
fn security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("0"),
        ))
}

pub fn create_router(config: Arc<AppConfig>) -> Router {
    let cors = cors_layer(&config.cors_origins);
    let body_limit = config.request_body_limit();
    let state = ApiState { config };

    // Wrong method on a known path answers like an unknown path
    let router = Router::new()
        .route("/api/health", get(health).fallback(not_found))
        .route("/api/sample-data", get(sample_data).fallback(not_found))
        .route("/api/upload", post(upload).fallback(not_found))
        .route("/api/download-template", get(download_template).fallback(not_found))
        .route("/api/report", post(export_report).fallback(not_found))
        .fallback(not_found)
        .with_state(state);

    security_headers(router)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    config: Arc<AppConfig>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let address = config.server_address();
    let port = config.port;
    let router = create_router(config);

    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("API Server listening on http://{}", address);
    info!("Health check: http://127.0.0.1:{}/api/health", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-VALUATION-BOUNDARY";

    fn router_with(config: AppConfig) -> Router {
        create_router(Arc::new(config))
    }

    fn multipart_body(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file {
                Some((file_name, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            name, file_name, content_type
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                    );
                }
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_of(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn year_csv() -> String {
        let mut csv = String::from("Month,Revenue,Expenses\n");
        for label in sample::MONTH_LABELS {
            csv.push_str(&format!("{},100000,60000\n", label));
        }
        csv
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = router_with(AppConfig::default())
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["message"], "Cash Flow Valuation API is running");
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_sample_data_endpoint() {
        let response = router_with(AppConfig::default())
            .oneshot(Request::builder().uri("/api/sample-data").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Sample data generated successfully");
        assert_eq!(json["data"]["companyName"], "Sample Corporation");
        assert_eq!(json["data"]["months"].as_array().unwrap().len(), 12);
        assert_eq!(json["data"]["months"][0]["month"], "Jan");
        assert_eq!(json["data"]["multiple"], 10.0);
    }

    #[tokio::test]
    async fn test_upload_csv() {
        let csv = year_csv();
        let body = multipart_body(&[
            ("companyName", None, &b"Acme Ltd"[..]),
            ("file", Some(("acme.csv", "text/csv")), csv.as_bytes()),
        ]);

        let response = router_with(AppConfig::default())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File processed successfully");
        assert_eq!(json["data"]["companyName"], "Acme Ltd");
        assert_eq!(json["data"]["totalRevenue"], 1_200_000.0);
        assert_eq!(json["data"]["totalCashFlow"], 480_000.0);
        assert_eq!(json["data"]["averageMonthlyCashFlow"], 40_000.0);
        assert_eq!(json["data"]["dcfValuation"], 400_000.0);
    }

    #[tokio::test]
    async fn test_upload_company_defaults_to_file_stem() {
        let csv = year_csv();
        let body = multipart_body(&[("file", Some(("Globex Q3.csv", "text/csv")), csv.as_bytes())]);

        let response = router_with(AppConfig::default())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        let json = json_of(response).await;
        assert_eq!(json["data"]["companyName"], "Globex Q3");
    }

    #[tokio::test]
    async fn test_upload_rejects_zip() {
        let body = multipart_body(&[("file", Some(("data.zip", "application/zip")), &b"PK\x03\x04"[..])]);

        let response = router_with(AppConfig::default())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid file type"));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversize() {
        let big = vec![b'a'; 6 * 1024 * 1024];
        let body = multipart_body(&[("file", Some(("big.csv", "text/csv")), big.as_slice())]);

        let response = router_with(AppConfig::default())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"], "File too large. Maximum size is 5MB.");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let body = multipart_body(&[("companyName", None, &b"Acme"[..])]);
        let response = router_with(AppConfig::default())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "No file uploaded");

        let not_multipart = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .body(Body::empty())
            .unwrap();
        let response = router_with(AppConfig::default())
            .oneshot(not_multipart)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparsable_upload_is_redacted_in_production() {
        let body = multipart_body(&[(
            "file",
            Some(("bad.csv", "text/csv")),
            &b"Month,Revenue,Expenses\nJan,lots,1\n"[..],
        )]);

        let response = router_with(AppConfig::default())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(response).await;
        assert_eq!(json["error"], "Failed to process file");
        assert_eq!(json["message"], "Something went wrong");
    }

    #[tokio::test]
    async fn test_unparsable_upload_shows_detail_in_development() {
        let body = multipart_body(&[(
            "file",
            Some(("bad.csv", "text/csv")),
            &b"Month,Revenue,Expenses\nJan,lots,1\n"[..],
        )]);
        let config = AppConfig {
            environment: Environment::Development,
            ..AppConfig::default()
        };

        let response = router_with(config).oneshot(upload_request(body)).await.unwrap();

        let json = json_of(response).await;
        assert!(json["message"].as_str().unwrap().contains("non-numeric revenue"));
    }

    #[tokio::test]
    async fn test_strict_horizon_rejects_short_upload() {
        let body = multipart_body(&[(
            "file",
            Some(("short.csv", "text/csv")),
            &b"Month,Revenue,Expenses\nJan,100,50\nFeb,100,50\n"[..],
        )]);

        let lenient = router_with(AppConfig::default())
            .oneshot(upload_request(body.clone()))
            .await
            .unwrap();
        assert_eq!(lenient.status(), StatusCode::OK);
        // 100 / 12 * 10
        assert_eq!(json_of(lenient).await["data"]["dcfValuation"], 83.0);

        let strict = AppConfig {
            strict_horizon: true,
            ..AppConfig::default()
        };
        let response = router_with(strict).oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "Expected 12 monthly rows, found 2");
    }

    #[tokio::test]
    async fn test_template_download() {
        let path = std::env::temp_dir().join(format!("template-{}.csv", Uuid::new_v4()));
        std::fs::write(&path, "Month,Revenue,Expenses\n").unwrap();
        let config = AppConfig {
            template_path: path.clone(),
            ..AppConfig::default()
        };

        let response = router_with(config)
            .oneshot(Request::builder().uri("/api/download-template").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"template-"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Month,Revenue,Expenses\n");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_template_is_server_error() {
        let config = AppConfig {
            template_path: std::env::temp_dir().join(format!("missing-{}.xlsx", Uuid::new_v4())),
            ..AppConfig::default()
        };

        let response = router_with(config)
            .oneshot(Request::builder().uri("/api/download-template").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(response).await["error"], "Failed to download template");
    }

    #[tokio::test]
    async fn test_report_export() {
        let months: Vec<MonthlyRecord> = sample::MONTH_LABELS
            .iter()
            .map(|m| MonthlyRecord::new(*m, 100_000.0, 60_000.0))
            .collect();
        let mut summary = compute_valuation(
            "Acme",
            &months,
            Multiple::default(),
            crate::models::Horizon::default(),
        );
        // tampered totals are recomputed
        summary.dcf_valuation = 1.0;

        let request = Request::builder()
            .method("POST")
            .uri("/api/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&summary).unwrap()))
            .unwrap();

        let response = router_with(AppConfig::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], report::REPORT_CONTENT_TYPE);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"Acme-Valuation-Report-"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("$400,000"));
        assert!(html.contains("40.0%"));
    }

    #[tokio::test]
    async fn test_report_rejects_bad_multiple() {
        let summary = compute_valuation(
            "Acme",
            &[],
            Multiple::default(),
            crate::models::Horizon::default(),
        );
        let mut json = serde_json::to_value(&summary).unwrap();
        json["multiple"] = serde_json::json!(0.0);

        let request = Request::builder()
            .method("POST")
            .uri("/api/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap();

        let response = router_with(AppConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_rejects_negative_figures() {
        let mut summary = compute_valuation(
            "Acme",
            &[MonthlyRecord::new("Jan", 100.0, 40.0)],
            Multiple::default(),
            crate::models::Horizon::default(),
        );
        summary.months[0].expenses = -40.0;

        let request = Request::builder()
            .method("POST")
            .uri("/api/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&summary).unwrap()))
            .unwrap();

        let response = router_with(AppConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(response).await["error"],
            "Negative expenses (-40) for month 'Jan'"
        );
    }

    #[tokio::test]
    async fn test_wrong_method_gets_json_not_found() {
        let response = router_with(AppConfig::default())
            .oneshot(Request::builder().uri("/api/upload").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let response = router_with(AppConfig::default())
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(response.headers()[header::REFERRER_POLICY], "no-referrer");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router_with(AppConfig::default())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["error"], "Endpoint not found");
    }

    #[test]
    fn test_company_from_file_name() {
        assert_eq!(company_from_file_name(Some("Acme.xlsx")), "Acme");
        assert_eq!(company_from_file_name(Some("dir/Initech.csv")), "Initech");
        assert_eq!(company_from_file_name(None), FALLBACK_COMPANY_NAME);
        assert_eq!(company_from_file_name(Some("")), FALLBACK_COMPANY_NAME);
    }
}
