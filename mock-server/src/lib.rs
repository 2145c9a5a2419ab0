use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub type Fields = Map<String, Value>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub fields: Fields,
}

#[derive(Default, Debug)]
pub struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Fields>,
}

impl Table {
    fn insert(&mut self, fields: Fields) -> i64 {
        self.next_id += 1;
        self.rows.insert(self.next_id, fields);
        self.next_id
    }

    fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows.iter().map(|(id, fields)| Record {
            id: *id,
            fields: fields.clone(),
        })
    }
}

/// doc id -> table id -> table
#[derive(Default, Debug)]
pub struct Docs {
    docs: HashMap<String, HashMap<String, Table>>,
}

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    docs: Arc<RwLock<Docs>>,
}

#[derive(Deserialize)]
pub struct RecordsQuery {
    filter: Option<String>,
    #[allow(dead_code)]
    noparse: Option<String>,
}

#[derive(Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub fields: Fields,
}

#[derive(Deserialize)]
pub struct RecordUpdate {
    pub id: i64,
    #[serde(default)]
    pub fields: Fields,
}

#[derive(Deserialize)]
pub struct RecordsBody<T> {
    pub records: Vec<T>,
}

#[derive(Deserialize)]
pub struct SqlRequest {
    pub sql: String,
    pub args: Option<Value>,
    pub timeout: Option<u64>,
}

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        docs: Arc::new(RwLock::new(Docs::default())),
    };
    Router::new()
        .route(
            "/api/docs/{doc_id}/tables/{table_id}/records",
            get(get_records).post(add_records).patch(patch_records),
        )
        .route("/api/docs/{doc_id}/tables/{table_id}/data/delete", post(delete_records))
        .route("/api/docs/{doc_id}/sql", post(sql))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = format!("Bearer {}", state.api_key);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

fn table_not_found(table_id: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, format!("Table not found \"{table_id}\""))
}

fn parse_filter(raw: &str) -> Result<HashMap<String, Vec<Value>>, ApiError> {
    serde_json::from_str(raw).map_err(|e| error(StatusCode::BAD_REQUEST, format!("Invalid filter: {e}")))
}

fn row_matches(fields: &Fields, filter: &HashMap<String, Vec<Value>>) -> bool {
    filter.iter().all(|(column, allowed)| {
        let value = fields.get(column).unwrap_or(&Value::Null);
        allowed.contains(value)
    })
}

async fn get_records(
    State(state): State<AppState>,
    Path((doc_id, table_id)): Path<(String, String)>,
    Query(query): Query<RecordsQuery>,
    headers: HeaderMap,
) -> ApiResult<Value> {
    authorize(&state, &headers)?;
    let filter = query.filter.as_deref().map(parse_filter).transpose()?;
    let docs = state.docs.read().await;
    let table = docs
        .docs
        .get(&doc_id)
        .and_then(|tables| tables.get(&table_id))
        .ok_or_else(|| table_not_found(&table_id))?;
    let records: Vec<Record> = table
        .records()
        .filter(|r| filter.as_ref().map_or(true, |f| row_matches(&r.fields, f)))
        .collect();
    Ok(Json(json!({ "records": records })))
}

async fn add_records(
    State(state): State<AppState>,
    Path((doc_id, table_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<RecordsBody<NewRecord>>,
) -> ApiResult<Value> {
    authorize(&state, &headers)?;
    let mut docs = state.docs.write().await;
    let table = docs
        .docs
        .entry(doc_id)
        .or_default()
        .entry(table_id)
        .or_default();
    let ids: Vec<Value> = body
        .records
        .into_iter()
        .map(|r| json!({ "id": table.insert(r.fields) }))
        .collect();
    Ok(Json(json!({ "records": ids })))
}

async fn patch_records(
    State(state): State<AppState>,
    Path((doc_id, table_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<RecordsBody<RecordUpdate>>,
) -> ApiResult<Value> {
    authorize(&state, &headers)?;
    let mut docs = state.docs.write().await;
    let table = docs
        .docs
        .get_mut(&doc_id)
        .and_then(|tables| tables.get_mut(&table_id))
        .ok_or_else(|| table_not_found(&table_id))?;
    // All ids are checked before any row is touched.
    if let Some(missing) = body.records.iter().find(|r| !table.rows.contains_key(&r.id)) {
        return Err(error(StatusCode::BAD_REQUEST, format!("Invalid row id {}", missing.id)));
    }
    for update in body.records {
        if let Some(row) = table.rows.get_mut(&update.id) {
            row.extend(update.fields);
        }
    }
    Ok(Json(Value::Null))
}

async fn delete_records(
    State(state): State<AppState>,
    Path((doc_id, table_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(ids): Json<Vec<i64>>,
) -> ApiResult<Value> {
    authorize(&state, &headers)?;
    let mut docs = state.docs.write().await;
    let table = docs
        .docs
        .get_mut(&doc_id)
        .and_then(|tables| tables.get_mut(&table_id))
        .ok_or_else(|| table_not_found(&table_id))?;
    if let Some(missing) = ids.iter().find(|id| !table.rows.contains_key(*id)) {
        return Err(error(StatusCode::BAD_REQUEST, format!("Invalid row id {missing}")));
    }
    for id in ids {
        table.rows.remove(&id);
    }
    Ok(Json(Value::Null))
}

/// Extract the table from `select * from <table>`; nothing else is supported.
fn select_all_table(sql: &str) -> Option<&str> {
    let mut words = sql.split_whitespace();
    let (Some(select), Some("*"), Some(from), Some(table), None) =
        (words.next(), words.next(), words.next(), words.next(), words.next())
    else {
        return None;
    };
    if !select.eq_ignore_ascii_case("select") || !from.eq_ignore_ascii_case("from") {
        return None;
    }
    Some(table.trim_end_matches(';'))
}

async fn sql(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SqlRequest>,
) -> ApiResult<Value> {
    authorize(&state, &headers)?;
    let table_id = select_all_table(&body.sql)
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Only 'select * from <table>' is supported"))?;
    let docs = state.docs.read().await;
    let table = docs
        .docs
        .get(&doc_id)
        .and_then(|tables| tables.get(table_id))
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, format!("no such table: {table_id}")))?;
    let records: Vec<Value> = table
        .records()
        .map(|r| {
            let mut fields = Map::new();
            fields.insert("id".to_string(), json!(r.id));
            fields.extend(r.fields);
            json!({ "fields": fields })
        })
        .collect();
    Ok(Json(json!({ "statement": body.sql, "records": records })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_to_json() {
        let mut fields = Fields::new();
        fields.insert("Name".to_string(), json!("Ann"));
        let record = Record { id: 1, fields };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, json!({"id": 1, "fields": {"Name": "Ann"}}));
    }

    #[test]
    fn table_assigns_increasing_ids() {
        let mut table = Table::default();
        assert_eq!(table.insert(Fields::new()), 1);
        assert_eq!(table.insert(Fields::new()), 2);
        table.rows.remove(&2);
        assert_eq!(table.insert(Fields::new()), 3);
    }

    #[test]
    fn new_record_defaults_fields_to_empty() {
        let input: NewRecord = serde_json::from_str("{}").unwrap();
        assert!(input.fields.is_empty());
    }

    #[test]
    fn record_update_requires_id() {
        let result: Result<RecordUpdate, _> = serde_json::from_str(r#"{"fields":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn filter_matches_any_value_within_column() {
        let mut fields = Fields::new();
        fields.insert("status".to_string(), json!("pending"));
        fields.insert("n".to_string(), json!(2));
        let filter = parse_filter(r#"{"status":["open","pending"],"n":[1,2]}"#).unwrap();
        assert!(row_matches(&fields, &filter));
        let filter = parse_filter(r#"{"status":["open"]}"#).unwrap();
        assert!(!row_matches(&fields, &filter));
    }

    #[test]
    fn select_all_table_parses_simple_queries() {
        assert_eq!(select_all_table("select * from Table1"), Some("Table1"));
        assert_eq!(select_all_table("SELECT * FROM People;"), Some("People"));
        assert_eq!(select_all_table("select id from Table1"), None);
        assert_eq!(select_all_table("delete from Table1"), None);
    }
}
