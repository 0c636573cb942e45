mod render;

use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    CalculatorInstance, CellEdit, EditableField, Highlight, HighlightEvent, ProjectionTable,
    ResolvedYearRow, TableInputs, apply_cell_edit, build_table, instances_from_value,
    parse_cell_input,
};

pub use render::{
    BodyCell, ClientNames, HeaderCell, body_cells, cell_text, format_currency, header_cells,
    render_text_table,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

pub const MAX_PROJECTION_YEARS: u32 = 150;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{0}")]
    Invalid(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid instances JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

fn invalid(msg: impl Into<String>) -> InputError {
    InputError::Invalid(msg.into())
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "advisor-projection",
    about = "Yearly capital assets projection table (fixed income, target income, net worth)"
)]
struct TableCli {
    #[arg(
        long,
        help = "JSON file holding one calculator instance or a list of instances"
    )]
    instances: Option<PathBuf>,
    #[arg(long, default_value_t = 2024, help = "First projection year")]
    start_year: i32,
    #[arg(
        long,
        default_value_t = 30,
        help = "Number of years projected beyond the start year"
    )]
    projection_years: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Target annual income in start-year money"
    )]
    target_income: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual inflation applied to the target income, in percent"
    )]
    inflation_rate: f64,
    #[arg(long, help = "Associated client's age in the start year")]
    associated_client_start_age: Option<u32>,
    #[arg(long, default_value = "Client")]
    primary_client_name: String,
    #[arg(long)]
    associated_client_name: Option<String>,
    #[arg(long, help = "Highlight to render: none, row:N, col:N or cell:R:C")]
    highlight: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TablePayload {
    #[serde(deserialize_with = "lenient_instances")]
    instances: Vec<CalculatorInstance>,
    start_year: Option<i32>,
    projection_years: Option<u32>,
    target_income: Option<f64>,
    inflation_rate: Option<f64>,
    associated_client_start_age: Option<u32>,
    primary_client_name: Option<String>,
    associated_client_name: Option<String>,
    edits: Vec<EditPayload>,
    highlight: Option<Highlight>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditPayload {
    year: i32,
    field: EditableField,
    #[serde(default)]
    input: Value,
}

impl EditPayload {
    fn to_cell_edit(&self) -> CellEdit {
        let value = match &self.input {
            Value::String(raw) => parse_cell_input(raw),
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            _ => None,
        };
        CellEdit {
            year: self.year,
            field: self.field,
            value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HighlightPayload {
    #[serde(default)]
    current: Highlight,
    event: HighlightEvent,
}

#[derive(Debug)]
struct TableRequest {
    inputs: TableInputs,
    instances: Vec<CalculatorInstance>,
    highlight: Highlight,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TableResponse {
    column_count: usize,
    has_associated_client_age: bool,
    highlight: Highlight,
    columns: Vec<HeaderCell>,
    rows: Vec<RowResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RowResponse {
    index: usize,
    values: ResolvedYearRow,
    cells: Vec<BodyCell>,
}

#[derive(Debug, Serialize)]
struct HighlightResponse {
    highlight: Highlight,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_table_inputs(cli: &TableCli) -> Result<TableInputs, InputError> {
    if !(1900..=2200).contains(&cli.start_year) {
        return Err(invalid("--start-year must be between 1900 and 2200"));
    }

    if cli.projection_years > MAX_PROJECTION_YEARS {
        return Err(invalid(format!(
            "--projection-years must be <= {MAX_PROJECTION_YEARS}"
        )));
    }

    if !cli.target_income.is_finite() || cli.target_income < 0.0 {
        return Err(invalid("--target-income must be >= 0"));
    }

    if !cli.inflation_rate.is_finite() || cli.inflation_rate <= -100.0 {
        return Err(invalid("--inflation-rate must be > -100"));
    }

    if cli.associated_client_start_age.is_some_and(|age| age > 150) {
        return Err(invalid("--associated-client-start-age must be <= 150"));
    }

    let associated_client_name = cli
        .associated_client_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(TableInputs {
        start_year: cli.start_year,
        projection_years: cli.projection_years,
        target_income: cli.target_income,
        inflation_rate: cli.inflation_rate,
        associated_client_start_age: cli.associated_client_start_age,
        primary_client_name: cli.primary_client_name.trim().to_string(),
        associated_client_name,
    })
}

fn parse_highlight(raw: &str) -> Result<Highlight, InputError> {
    let syntax = || invalid(format!("--highlight {raw:?} must be none, row:N, col:N or cell:R:C"));
    let parts = raw.trim().split(':').collect::<Vec<_>>();
    let number = |s: &str| s.trim().parse::<usize>().map_err(|_| syntax());
    match parts.as_slice() {
        ["none"] => Ok(Highlight::None),
        ["row", index] => Ok(Highlight::Row {
            index: number(index)?,
        }),
        ["col", index] => Ok(Highlight::Col {
            index: number(index)?,
        }),
        ["cell", row, col] => Ok(Highlight::Cell {
            row: number(row)?,
            col: number(col)?,
        }),
        _ => Err(syntax()),
    }
}

fn check_highlight(highlight: Highlight, inputs: &TableInputs) -> Result<(), InputError> {
    let cols = crate::core::column_count(inputs.associated_client_start_age.is_some());
    if highlight.fits(inputs.row_count(), cols) {
        Ok(())
    } else {
        Err(invalid("highlight is outside the table"))
    }
}

fn lenient_instances<'de, D>(deserializer: D) -> Result<Vec<CalculatorInstance>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(instances_from_value)
}

fn parse_instances(json: &str) -> Result<Vec<CalculatorInstance>, InputError> {
    let value = serde_json::from_str::<Value>(json)?;
    Ok(instances_from_value(value))
}

fn apply_edits(instances: &mut [CalculatorInstance], edits: &[EditPayload]) {
    let Some(target) = instances
        .iter_mut()
        .find(|instance| instance.is_capital_assets())
    else {
        if !edits.is_empty() {
            warn!(edits = edits.len(), "no capital_assets instance to apply edits to");
        }
        return;
    };
    for edit in edits {
        apply_cell_edit(target, &edit.to_cell_edit());
    }
}

pub fn render_from_args(args: &[String]) -> Result<String, InputError> {
    let cli = TableCli::try_parse_from(args)?;
    let inputs = build_table_inputs(&cli)?;
    let highlight = match cli.highlight.as_deref() {
        Some(raw) => parse_highlight(raw)?,
        None => Highlight::None,
    };
    check_highlight(highlight, &inputs)?;

    let instances = match &cli.instances {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|source| InputError::Read {
                path: path.display().to_string(),
                source,
            })?;
            parse_instances(&json)?
        }
        None => Vec::new(),
    };

    let table = build_table(&inputs, &instances);
    Ok(render_text_table(&table, client_names(&inputs), highlight))
}

fn client_names(inputs: &TableInputs) -> ClientNames<'_> {
    ClientNames {
        primary: &inputs.primary_client_name,
        associated: inputs.associated_client_name.as_deref(),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/projection-table", post(table_handler))
        .route("/api/highlight", post(highlight_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "projection table HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn table_handler(payload: Result<Json<TablePayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let request = match table_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    let table = build_table(&request.inputs, &request.instances);
    let response = build_table_response(&request.inputs, &table, request.highlight);
    json_response(StatusCode::OK, response)
}

async fn highlight_handler(payload: Result<Json<HighlightPayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let highlight = payload.current.on_double_click(payload.event);
    json_response(StatusCode::OK, HighlightResponse { highlight })
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn table_request_from_json(json: &str) -> Result<TableRequest, InputError> {
    let payload = serde_json::from_str::<TablePayload>(json)?;
    table_request_from_payload(payload)
}

fn table_request_from_payload(payload: TablePayload) -> Result<TableRequest, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.start_year {
        cli.start_year = v;
    }
    if let Some(v) = payload.projection_years {
        cli.projection_years = v;
    }
    if let Some(v) = payload.target_income {
        cli.target_income = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.associated_client_start_age {
        cli.associated_client_start_age = Some(v);
    }
    if let Some(v) = payload.primary_client_name {
        cli.primary_client_name = v;
    }
    if let Some(v) = payload.associated_client_name {
        cli.associated_client_name = Some(v);
    }

    let inputs = build_table_inputs(&cli)?;
    let highlight = payload.highlight.unwrap_or_default();
    check_highlight(highlight, &inputs)?;

    let mut instances = payload.instances;
    apply_edits(&mut instances, &payload.edits);

    Ok(TableRequest {
        inputs,
        instances,
        highlight,
    })
}

fn default_cli_for_api() -> TableCli {
    TableCli {
        instances: None,
        start_year: 2024,
        projection_years: 30,
        target_income: 0.0,
        inflation_rate: 2.0,
        associated_client_start_age: None,
        primary_client_name: "Client".to_string(),
        associated_client_name: None,
        highlight: None,
    }
}

fn build_table_response(
    inputs: &TableInputs,
    table: &ProjectionTable,
    highlight: Highlight,
) -> TableResponse {
    let names = client_names(inputs);
    TableResponse {
        column_count: table.layout.column_count(),
        has_associated_client_age: table.layout.has_associated_age,
        highlight,
        columns: header_cells(table.layout, names, highlight),
        rows: table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| RowResponse {
                index,
                values: row.clone(),
                cells: body_cells(row, index, table.layout, highlight),
            })
            .collect(),
    }
}
