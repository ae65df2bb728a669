//! 远程关系库后端（PostgREST 方言）
//!
//! 三张表与记录名一一对应：`faculties`、`classrooms`、`robot_state`，
//! `classrooms.faculty_id` 外键引用 `faculties.id`。
//!
//! # 请求映射
//!
//! | 操作 | 单例（robot_state） | 列表 |
//! |------|-------------------|------|
//! | load | `GET ?select=*&limit=1` | `GET ?select=*` |
//! | save | `PATCH ?id=eq.<id>` | `POST`（merge-duplicates 即 upsert） |
//! | insert_unique | `POST` | `POST` |
//! | remove | `DELETE ?id=not.is.null` | 同左 |
//!
//! 唯一约束冲突以 HTTP 409 或 Postgres 错误码 `23505` 返回，统一映射为
//! [`StoreError::Conflict`]。
//!
//! # 表结构
//!
//! 建表脚本见 [`SCHEMA_SQL`]（`migrations/0001_create_schema.sql`），需在远程库上执行一次，
//! 例如 `guide-cli config schema | psql "$SUPABASE_DB_URL"`。
//! `robot_state.id` 必须是主键，否则并发首次创建不会产生冲突。

use std::time::Duration;

use async_trait::async_trait;
use guide_protocol::RecordKey;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{KeyValueStore, RemoteConfig, StoreError};

/// 远程库建表脚本
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_create_schema.sql");

/// Postgres unique_violation 错误码
pub const UNIQUE_VIOLATION: &str = "23505";

const BACKEND: &str = "remote";

/// 远程关系库存储
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    /// 按配置创建客户端
    ///
    /// 存储层本身不设超时；`timeout_ms` 只作用于 HTTP 客户端。
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.api_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.api_key))?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// 表的 REST 端点
    pub fn table_url(&self, key: RecordKey) -> String {
        format!("{}/rest/v1/{}", self.base_url, key)
    }

    /// 连通性检查：从 `faculties` 表读取一行 id
    pub async fn ping(&self) -> Result<usize, StoreError> {
        let response = self
            .client
            .get(self.table_url(RecordKey::Faculties))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        let rows = json_rows(check(response, RecordKey::Faculties).await?).await?;
        Ok(rows.len())
    }

    async fn insert_rows(&self, key: RecordKey, body: &Value, upsert: bool) -> Result<Vec<Value>, StoreError> {
        let prefer = if upsert {
            "resolution=merge-duplicates,return=representation"
        } else {
            "return=representation"
        };
        let response = self
            .client
            .post(self.table_url(key))
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        json_rows(check(response, key).await?).await
    }
}

#[async_trait]
impl KeyValueStore for RemoteStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn load(&self, key: RecordKey) -> Result<Option<Value>, StoreError> {
        let mut request = self.client.get(self.table_url(key)).query(&[("select", "*")]);
        if key.is_singleton() {
            request = request.query(&[("limit", "1")]);
        }

        let rows = json_rows(check(request.send().await?, key).await?).await?;
        debug!(key = %key, rows = rows.len(), "remote load");

        if key.is_singleton() {
            Ok(rows.into_iter().next())
        } else {
            Ok(Some(Value::Array(rows)))
        }
    }

    async fn save(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        if !key.is_singleton() {
            let rows = self.insert_rows(key, value, true).await?;
            return Ok(Value::Array(rows));
        }

        let id = value
            .get("id")
            .and_then(Value::as_str)
            .ok_or(StoreError::NotFound { key })?;
        let response = self
            .client
            .patch(self.table_url(key))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(value)
            .send()
            .await?;

        json_rows(check(response, key).await?)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { key })
    }

    async fn insert_unique(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        let rows = self.insert_rows(key, value, false).await?;
        if key.is_singleton() {
            rows.into_iter().next().ok_or(StoreError::NotFound { key })
        } else {
            Ok(Value::Array(rows))
        }
    }

    async fn remove(&self, keys: &[RecordKey]) -> Result<(), StoreError> {
        for &key in delete_order(keys).iter() {
            let response = self
                .client
                .delete(self.table_url(key))
                .query(&[("id", "not.is.null")])
                .send()
                .await?;
            check(response, key).await?;
        }
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|e| StoreError::Config(format!("invalid remote api key: {}", e)))
}

/// 把非 2xx 响应映射为存储错误
async fn check(response: Response, key: RecordKey) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::CONFLICT || is_unique_violation(&body) {
        return Err(StoreError::Conflict { key });
    }

    Err(StoreError::Unavailable {
        backend: BACKEND,
        reason: format!("{}: {}", status, body.trim()),
    })
}

async fn json_rows(response: Response) -> Result<Vec<Value>, StoreError> {
    let body = response.json::<Value>().await?;
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// 错误体是否为 Postgres 唯一约束冲突
pub fn is_unique_violation(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_str).map(|code| code == UNIQUE_VIOLATION))
        .unwrap_or(false)
}

/// 删除顺序：先删引用方（教室），再删被引用方（学院）
fn delete_order(keys: &[RecordKey]) -> Vec<RecordKey> {
    let mut ordered = keys.to_vec();
    ordered.sort_by_key(|key| match key {
        RecordKey::Classrooms => 0,
        RecordKey::RobotState => 1,
        RecordKey::Faculties => 2,
    });
    ordered.dedup();
    ordered
}
