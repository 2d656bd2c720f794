use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// A parsed multipart form: text fields by name plus any attached files.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: Vec<UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to process upload: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(|f| f.to_string()) {
                Some(filename) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                    if !data.is_empty() {
                        form.files.push(UploadedFile {
                            field: name,
                            filename,
                            data: data.to_vec(),
                        });
                    }
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
                    form.fields.entry(name).or_default().push(value);
                }
            }
        }

        Ok(form)
    }

    /// First non-blank value of `name`, trimmed.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    pub fn require(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
    }

    pub fn number<T: FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.text(name) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("{} must be a number", name))),
            None => Ok(None),
        }
    }

    /// Decimal amount such as `12.50` converted to cents.
    pub fn cents(&self, name: &str) -> AppResult<Option<i64>> {
        match self.number::<f64>(name)? {
            Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(Some((amount * 100.0).round() as i64)),
            Some(_) => Err(AppError::BadRequest(format!("{} must not be negative", name))),
            None => Ok(None),
        }
    }

    pub fn boolean(&self, name: &str) -> AppResult<Option<bool>> {
        match self.text(name).as_deref() {
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(_) => Err(AppError::BadRequest(format!("{} must be true or false", name))),
            None => Ok(None),
        }
    }

    /// Structured field sent as JSON text.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> AppResult<Option<T>> {
        match self.text(name) {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", name, e))),
            None => Ok(None),
        }
    }

    /// A repeated field, or a single JSON array of strings.
    pub fn list(&self, name: &str) -> AppResult<Option<Vec<String>>> {
        let Some(values) = self.fields.get(name) else {
            return Ok(None);
        };

        if let [single] = values.as_slice() {
            if single.trim_start().starts_with('[') {
                return self.json(name);
            }
        }

        Ok(Some(
            values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        ))
    }

    /// The file sent under `field`, or the only file when the form has one.
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files
            .iter()
            .find(|f| f.field == field)
            .or_else(|| match self.files.as_slice() {
                [only] => Some(only),
                _ => None,
            })
    }
}

/// Uploads `file` under `folder` and returns the URL clients should use.
pub async fn store_file(state: &AppState, folder: &str, file: &UploadedFile) -> AppResult<String> {
    let path = state.storage.upload(folder, &file.filename, &file.data).await?;
    tracing::debug!("Stored {} as {}", file.filename, path);
    Ok(state.storage.public_url(&path))
}

/// Best-effort removal of a stored file. Failures are logged, not returned.
pub async fn discard_file(state: &AppState, url: &str) {
    if let Err(e) = state.storage.delete(url).await {
        tracing::warn!("Failed to delete stored file {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductSize;

    fn form(fields: &[(&str, &str)]) -> FormData {
        let mut form = FormData::default();
        for (name, value) in fields {
            form.fields.entry(name.to_string()).or_default().push(value.to_string());
        }
        form
    }

    #[test]
    fn text_skips_blank_values() {
        let f = form(&[("name", "  "), ("name", " Pasta ")]);
        assert_eq!(f.text("name").as_deref(), Some("Pasta"));
        assert_eq!(f.text("missing"), None);
        assert!(matches!(f.require("missing"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn cents_parses_decimal_prices() {
        let f = form(&[("base_price", "12.5"), ("discount_price", "abc"), ("neg", "-1")]);
        assert_eq!(f.cents("base_price").unwrap(), Some(1250));
        assert!(f.cents("discount_price").is_err());
        assert!(f.cents("neg").is_err());
        assert_eq!(f.cents("missing").unwrap(), None);
    }

    #[test]
    fn list_accepts_repeated_fields_or_json() {
        let repeated = form(&[("ingredients", "basil"), ("ingredients", "tomato")]);
        assert_eq!(repeated.list("ingredients").unwrap(), Some(vec!["basil".to_string(), "tomato".to_string()]));

        let json = form(&[("ingredients", r#"["basil","garlic"]"#)]);
        assert_eq!(json.list("ingredients").unwrap(), Some(vec!["basil".to_string(), "garlic".to_string()]));
    }

    #[test]
    fn json_fields_decode_structured_values() {
        let f = form(&[("sizes", r#"[{"size":"large","price_cents":1500}]"#), ("extras", "{oops")]);
        let sizes: Vec<ProductSize> = f.json("sizes").unwrap().unwrap();
        assert_eq!(sizes[0].price_cents, 1500);
        assert!(f.json::<Vec<ProductSize>>("extras").is_err());
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        let f = form(&[("a", "true"), ("b", "0"), ("c", "maybe")]);
        assert_eq!(f.boolean("a").unwrap(), Some(true));
        assert_eq!(f.boolean("b").unwrap(), Some(false));
        assert!(f.boolean("c").is_err());
    }

    #[test]
    fn single_file_is_found_under_any_name() {
        let mut f = FormData::default();
        f.files.push(UploadedFile {
            field: "upload".to_string(),
            filename: "a.png".to_string(),
            data: vec![1, 2, 3],
        });
        assert!(f.file("image").is_some());

        f.files.push(UploadedFile {
            field: "image".to_string(),
            filename: "b.png".to_string(),
            data: vec![4],
        });
        assert_eq!(f.file("image").map(|file| file.filename.as_str()), Some("b.png"));
        assert!(f.file("legal_copy").is_none());
    }
}
