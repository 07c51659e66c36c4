//! Turns CMS response bodies into canonical records.
//!
//! Two body shapes are accepted: a bare JSON array of records, or an
//! envelope `{ "data": [...], "meta": { "pagination": {...} } }`. Each
//! record may itself be flat or wrap its fields in `attributes`, with
//! relations nested as `{ "data": { "attributes": {...} } }`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{parse_datetime, Article, Category, Seo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain records; filtering and paging still have to happen locally.
    Records(Vec<Value>),
    /// Records the server already filtered, sorted and paged.
    Envelope {
        records: Vec<Value>,
        pagination: Option<Pagination>,
    },
}

impl Payload {
    pub fn records(&self) -> &[Value] {
        match self {
            Payload::Records(records) => records,
            Payload::Envelope { records, .. } => records,
        }
    }
}

pub fn parse_payload(body: Value) -> Result<Payload> {
    match body {
        Value::Array(records) => Ok(Payload::Records(records)),
        Value::Object(mut envelope) => {
            let records = match envelope.remove("data") {
                Some(Value::Array(records)) => records,
                Some(Value::Null) => Vec::new(),
                Some(record @ Value::Object(_)) => vec![record],
                Some(other) => {
                    return Err(AppError::UnexpectedShape(format!(
                        "`data` is {}",
                        type_name(&other)
                    )))
                }
                None => {
                    return Err(AppError::UnexpectedShape(
                        "object without `data`".to_string(),
                    ))
                }
            };

            let pagination = envelope
                .get("meta")
                .and_then(|meta| meta.get("pagination"))
                .map(|p| serde_json::from_value::<Pagination>(p.clone()))
                .transpose()?;

            Ok(Payload::Envelope {
                records,
                pagination,
            })
        }
        other => Err(AppError::UnexpectedShape(format!(
            "body is {}",
            type_name(&other)
        ))),
    }
}

pub fn normalize_article(raw: &Value) -> Result<Article> {
    let record = raw
        .as_object()
        .ok_or_else(|| AppError::UnexpectedShape(format!("record is {}", type_name(raw))))?;
    let fields = attributes(record);

    let id = text(fields, &["slug"])
        .or_else(|| text(record, &["slug", "documentId", "id"]))
        .or_else(|| text(fields, &["documentId", "id"]))
        .ok_or(AppError::MissingField("id"))?;
    let title = text(fields, &["title"]).ok_or(AppError::MissingField("title"))?;

    let reading_time = fields
        .get("readingTime")
        .or_else(|| fields.get("reading_time"))
        .and_then(as_u32)
        .filter(|minutes| *minutes >= 1)
        .unwrap_or(1);

    let publish_date = text(fields, &["publishDate", "publish_date", "publishedAt"])
        .and_then(|s| parse_datetime(&s))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let tags = fields.get("tags").map(relation_names).unwrap_or_default();

    let seo = fields
        .get("seo")
        .and_then(Value::as_object)
        .map(|seo| Seo {
            title: text(seo, &["title", "metaTitle"]),
            description: text(seo, &["description", "metaDescription"]),
            keywords: text(seo, &["keywords"]),
        })
        .filter(|seo| !seo.is_empty());

    Ok(Article {
        id,
        category: fields
            .get("category")
            .and_then(relation_name)
            .unwrap_or_default(),
        title,
        preview: text(fields, &["preview", "excerpt", "description"]).unwrap_or_default(),
        content: text(fields, &["content", "body"]).unwrap_or_default(),
        reading_time,
        publish_date,
        author: fields.get("author").and_then(relation_name),
        tags,
        seo,
    })
}

pub fn normalize_category(raw: &Value) -> Result<Category> {
    let record = raw
        .as_object()
        .ok_or_else(|| AppError::UnexpectedShape(format!("record is {}", type_name(raw))))?;
    let fields = attributes(record);

    let key = text(fields, &["key", "slug", "name"])
        .map(|k| k.to_lowercase())
        .ok_or(AppError::MissingField("key"))?;
    let label = text(fields, &["label", "name"]).unwrap_or_else(|| key.clone());

    Ok(Category {
        label,
        color: text(fields, &["color"]).unwrap_or_else(|| "#64748b".to_string()),
        icon: text(fields, &["icon"]).unwrap_or_else(|| "📄".to_string()),
        key,
    })
}

fn attributes(record: &Map<String, Value>) -> &Map<String, Value> {
    record
        .get("attributes")
        .and_then(Value::as_object)
        .unwrap_or(record)
}

/// First non-empty value among `keys`, with numbers rendered as text.
fn text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.ceil() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Display name of a relation: a plain string, a `{name}` object, or either
/// of those wrapped in `data` / `attributes`.
fn relation_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => {
            if let Some(inner) = map.get("data") {
                return relation_name(inner);
            }
            text(attributes(map), &["name", "label", "title", "username"])
        }
        _ => None,
    }
}

fn relation_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(relation_name).collect(),
        Value::Object(map) => map.get("data").map(relation_names).unwrap_or_default(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
