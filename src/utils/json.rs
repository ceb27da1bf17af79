use crate::document::Document;
use crate::errors::DbError;

/// Parse a JSON object into a framed [`Document`]. Extended JSON (`{"$oid": ...}`) is honoured.
pub fn json_to_document(json: &str) -> Result<Document<'static>, DbError> {
    let val: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Object(obj) = val else {
        return Err(DbError::InvalidDocument("expected a JSON object".into()));
    };
    let bdoc = bson::Document::try_from(obj).map_err(|e| DbError::InvalidDocument(e.to_string()))?;
    Document::from_bson(&bdoc)
}

/// Render a document as one line of relaxed extended JSON.
pub fn document_to_json(doc: &Document<'_>) -> Result<String, DbError> {
    let value = bson::Bson::Document(doc.to_bson()?).into_relaxed_extjson();
    Ok(serde_json::to_string(&value)?)
}
