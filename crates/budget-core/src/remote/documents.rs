//! Mapping between records and remote documents.
//!
//! Records serialize to their camelCase field map. The document identifier
//! is the record's numeric id rendered as a string; unsaved records (id 0)
//! get a store-generated identifier instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Document, RemoteError, RemoteResult};
use crate::storage::types::{UserProfile, UNASSIGNED_ID};

/// Document path for a record id, or `None` when the store must generate one.
pub fn document_id(id: i64) -> Option<String> {
    (id != UNASSIGNED_ID).then(|| id.to_string())
}

pub fn to_document<T: Serialize>(record: &T) -> RemoteResult<Value> {
    Ok(serde_json::to_value(record)?)
}

/// Decode a document into a record.
pub fn from_document<T: DeserializeOwned>(doc: &Document) -> RemoteResult<T> {
    serde_json::from_value(doc.data.clone())
        .map_err(|e| RemoteError::invalid_document(doc.id.clone(), e))
}

/// Profiles are keyed by owner; the document id is authoritative over any
/// `id` field in the body.
pub fn profile_from_document(doc: &Document) -> RemoteResult<UserProfile> {
    let mut profile: UserProfile = from_document(doc)?;
    profile.id = doc.id.clone();
    Ok(profile)
}

/// Profile body without the identifier, which lives in the path.
pub fn profile_to_document(profile: &UserProfile) -> RemoteResult<Value> {
    let mut value = to_document(profile)?;
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
    }
    Ok(value)
}
