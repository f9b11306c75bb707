use axum::body::Bytes;
use serde_json::Value;

use crate::entities::product_media::MediaType;
use crate::error::AppError;

pub const MAX_FILES: usize = 10;
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Text fields of a product form, exactly as received.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_name: Option<String>,
    pub category_name_en: Option<String>,
    pub tags: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub sizes: Option<String>,
}

/// A validated product write.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category_name: String,
    pub category_name_en: String,
    pub tags: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub stock: i32,
    /// `None` leaves existing sizes untouched on update.
    pub sizes: Option<Vec<SizeInput>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeInput {
    pub size: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn media_type(&self) -> MediaType {
        MediaType::from_content_type(&self.content_type)
    }
}

impl ProductFields {
    pub fn validate(self) -> Result<ProductInput, AppError> {
        let name = non_blank(self.name);
        let category_name = non_blank(self.category_name);
        let category_name_en = non_blank(self.category_name_en);

        let (Some(name), Some(category_name), Some(category_name_en)) =
            (name, category_name, category_name_en)
        else {
            return Err(AppError::BadRequest(
                "Name and category names are required.".to_string(),
            ));
        };

        Ok(ProductInput {
            name,
            description: non_blank(self.description),
            category_name,
            category_name_en,
            tags: non_blank(self.tags),
            brand: non_blank(self.brand),
            price: self.price.as_deref().map(parse_price).unwrap_or(0.0),
            stock: self.stock.as_deref().map(parse_int).unwrap_or(0),
            sizes: self.sizes.as_deref().and_then(parse_sizes),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Longest leading `[+-]?digits[.digits]` run, after leading whitespace.
fn numeric_prefix(raw: &str, allow_fraction: bool) -> &str {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {}
            b'.' if allow_fraction && !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    &s[..end]
}

/// Leading decimal number of `raw`, or 0.
pub fn parse_price(raw: &str) -> f64 {
    numeric_prefix(raw, true)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Leading integer of `raw`, or 0.
pub fn parse_int(raw: &str) -> i32 {
    numeric_prefix(raw, false).parse::<i32>().unwrap_or(0)
}

/// Parses the `sizes` form field. Anything that is not a JSON array means
/// "no sizes supplied".
pub fn parse_sizes(raw: &str) -> Option<Vec<SizeInput>> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Some(items.iter().map(size_from_json).collect()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Ignoring unparseable sizes field: {}", e);
            None
        }
    }
}

fn size_from_json(item: &Value) -> SizeInput {
    let size = match item.get("size") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let quantity = match item.get("quantity") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => i64::from(parse_int(s)),
        _ => 0,
    };

    SizeInput {
        size,
        quantity: quantity.clamp(0, i64::from(i32::MAX)) as i32,
    }
}
