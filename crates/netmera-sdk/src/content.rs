//! Content records
//!
//! A [`NetmeraContent`] is a schemaless key/value record bound to an object
//! kind. Records are created, updated and deleted against the backend; reads
//! go through [`NetmeraService`](crate::NetmeraService).

use crate::action_token::{ActionScope, ActionTokenGate};
use crate::geo::GeoLocation;
use crate::session::Session;
use netmera_client::{
    endpoints, params, BackendProfile, Dispatcher, Entry, EntryEnvelope, FormRequest,
    NetmeraError, Result,
};
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// A value accepted by [`NetmeraContent::add`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    /// Expanded into the combined, latitude and longitude fields
    Geo(GeoLocation),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<GeoLocation> for FieldValue {
    fn from(location: GeoLocation) -> Self {
        FieldValue::Geo(location)
    }
}

macro_rules! json_field_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Json(Value::from(value))
                }
            }
        )*
    };
}

json_field_value!(&str, String, bool, i32, i64, u32, u64, f64, Vec<Value>, Map<String, Value>);

/// A content record of one object kind
#[derive(Clone)]
pub struct NetmeraContent {
    dispatcher: Dispatcher,
    session: Session,
    object_name: String,
    data: Map<String, Value>,
    path: Option<String>,
    content_type: Option<String>,
    owner: Option<Value>,
    privacy: Option<String>,
    moderation_status: Option<String>,
    has_owner: bool,
}

impl std::fmt::Debug for NetmeraContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetmeraContent")
            .field("object_name", &self.object_name)
            .field("path", &self.path)
            .field("data", &self.data)
            .field("has_owner", &self.has_owner)
            .finish_non_exhaustive()
    }
}

impl NetmeraContent {
    /// Empty, unsaved record of the given kind
    pub fn new(dispatcher: Dispatcher, session: Session, object_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            session,
            object_name: object_name.into(),
            data: Map::new(),
            path: None,
            content_type: None,
            owner: None,
            privacy: None,
            moderation_status: None,
            has_owner: false,
        }
    }

    /// Record hydrated from a server entry
    ///
    /// The entry's type discriminator wins; `kind` is used when it is missing.
    pub(crate) fn from_entry(
        dispatcher: Dispatcher,
        session: Session,
        kind: &str,
        entry: Entry,
    ) -> Self {
        let mut content = Self::new(dispatcher, session, kind);
        content.apply_entry(entry);
        content
    }

    // ==================== Fields ====================

    /// Store a value under `key`, replacing any previous value
    pub fn add(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<()> {
        if key.is_empty() {
            return Err(NetmeraError::required("key"));
        }

        match value.into() {
            FieldValue::Json(Value::Null) => Err(NetmeraError::required("value")),
            FieldValue::Json(value) => {
                self.data.insert(key.to_string(), value);
                Ok(())
            }
            FieldValue::Geo(location) => {
                self.data.insert(
                    format!("{}{}", key, params::LOCATION_SUFFIX),
                    Value::String(location.to_pair_string()),
                );
                self.data.insert(
                    format!("{}{}", key, params::LATITUDE_SUFFIX),
                    Value::from(location.latitude()),
                );
                self.data.insert(
                    format!("{}{}", key, params::LONGITUDE_SUFFIX),
                    Value::from(location.longitude()),
                );
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Numeric value, or 0 when missing or not a number
    pub fn get_number(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Boolean value, or false when missing or not a boolean
    pub fn get_boolean(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_json_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    pub fn get_json_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Location stored under `key` by [`add`](Self::add); both coordinates must be numbers
    pub fn get_geo_location(&self, key: &str) -> Option<GeoLocation> {
        let latitude = self
            .get(&format!("{}{}", key, params::LATITUDE_SUFFIX))
            .and_then(Value::as_f64)?;
        let longitude = self
            .get(&format!("{}{}", key, params::LONGITUDE_SUFFIX))
            .and_then(Value::as_f64)?;
        Some(GeoLocation::new(latitude, longitude))
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    // ==================== Identity ====================

    /// Server path; `None` until the record is saved or a path is set
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Point this record at an existing server path for update or delete
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn owner(&self) -> Option<&Value> {
        self.owner.as_ref()
    }

    pub fn privacy(&self) -> Option<&str> {
        self.privacy.as_deref()
    }

    pub fn moderation_status(&self) -> Option<&str> {
        self.moderation_status.as_deref()
    }

    /// Make the logged-in user the owner; later mutations use the owner token
    pub fn set_owner(&mut self) -> Result<()> {
        self.session.require_login()?;
        self.has_owner = true;
        Ok(())
    }

    // ==================== Mutations ====================

    /// Save this record as a new item under the parent path
    pub async fn create(&mut self) -> Result<()> {
        let profile = self.profile().clone();
        self.stamp_kind(&profile);
        let token = self.session.token_for(self.has_owner)?;

        let scope = ActionScope::new(
            &profile.service_name,
            &profile.parent_path,
            &profile.create_action,
        );
        let request = FormRequest::post(endpoints::CREATE_CONTENT, &token);
        let dispatcher = self.dispatcher.clone();
        let content = Value::Object(self.data.clone());

        let envelope: EntryEnvelope = ActionTokenGate::new(self.dispatcher.clone())
            .run(&token, &scope, |action_token| async move {
                let request = request
                    .param(params::CONTENT_ACTION_TOKEN, action_token)
                    .param(params::PATH, &profile.parent_path)
                    .param(params::CONTENT_TYPE, &profile.content_type)
                    .param(params::CONTENT_NAME, content_name())
                    .content(content);
                dispatcher.send_as(request).await
            })
            .await?;

        self.apply_response(envelope)?;
        info!(kind = %self.object_name, path = ?self.path, "content created");
        Ok(())
    }

    /// Save local changes over the record at [`path`](Self::path)
    pub async fn update(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or_else(|| NetmeraError::required("path"))?;
        let profile = self.profile().clone();
        self.stamp_kind(&profile);
        let token = self.session.token_for(self.has_owner)?;

        let scope = ActionScope::new(&profile.service_name, &path, &profile.update_action);
        let privacy = self.privacy.clone().unwrap_or_else(|| profile.privacy_type.clone());
        let moderation = self
            .moderation_status
            .clone()
            .unwrap_or_else(|| profile.moderation_status.clone());
        let request = FormRequest::post(endpoints::UPDATE_CONTENT, &token);
        let dispatcher = self.dispatcher.clone();
        let content = Value::Object(self.data.clone());

        let envelope: EntryEnvelope = ActionTokenGate::new(self.dispatcher.clone())
            .run(&token, &scope, |action_token| async move {
                let request = request
                    .param(params::CONTENT_ACTION_TOKEN, action_token)
                    .param(params::CONTENT_PRIVACY, privacy)
                    .param(params::MODERATION_STATUS, moderation)
                    .param(params::PATH, &path)
                    .param(params::CONTENT_TYPE, &profile.content_type)
                    .param(params::CONTENT_NAME, content_name())
                    .content(content);
                dispatcher.send_as(request).await
            })
            .await?;

        self.apply_response(envelope)?;
        info!(kind = %self.object_name, path = ?self.path, "content updated");
        Ok(())
    }

    /// Delete the record at [`path`](Self::path) and clear local state
    pub async fn delete(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or_else(|| NetmeraError::required("path"))?;
        let token = self.session.token_for(self.has_owner)?;

        self.dispatcher
            .send(FormRequest::post(endpoints::DELETE_CONTENT, token).param(params::PATH, &path))
            .await?;

        self.clear();
        info!(kind = %self.object_name, path = %path, "content deleted");
        Ok(())
    }

    // ==================== Helper Methods ====================

    fn profile(&self) -> &BackendProfile {
        &self.dispatcher.config().profile
    }

    fn stamp_kind(&mut self, profile: &BackendProfile) {
        self.data.insert(
            profile.type_field.clone(),
            Value::String(self.object_name.clone()),
        );
    }

    fn apply_response(&mut self, envelope: EntryEnvelope) -> Result<()> {
        let entry = envelope
            .entry
            .ok_or_else(|| NetmeraError::Io("entry missing from response".to_string()))?;
        self.apply_entry(entry);
        Ok(())
    }

    /// Replace local state with a server entry
    pub(crate) fn apply_entry(&mut self, entry: Entry) {
        let type_field = &self.dispatcher.config().profile.type_field;
        if let Some(kind) = entry.content.data.get(type_field).and_then(Value::as_str) {
            self.object_name = kind.to_string();
        }
        self.data = entry.content.data;
        self.path = entry.content.path;
        self.privacy = entry.content.privacy_type_name;
        self.moderation_status = entry.content.moderation_status;
        self.content_type = entry.entry_type;
        self.owner = entry.owner;
        debug!(kind = %self.object_name, path = ?self.path, "content state refreshed");
    }

    fn clear(&mut self) {
        self.data.clear();
        self.path = None;
        self.content_type = None;
        self.owner = None;
        self.privacy = None;
        self.moderation_status = None;
    }
}

fn content_name() -> u32 {
    rand::thread_rng().gen_range(1..=1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserProfile;
    use crate::test_support::RecordingTransport;
    use netmera_client::{ClientConfig, ErrorCode, Method};
    use serde_json::json;
    use std::sync::Arc;

    const TOKEN_OK: &str = r#"{"entry": {"key": "act-1"}}"#;
    const SAVED: &str = r#"{
        "entry": {
            "content": {
                "data": {"title": "Hello", "netmera-mobimera:api-content-type": "Blog"},
                "path": "/mobimeracontents/42",
                "privacyTypeName": "public",
                "moderationStatus": "production"
            },
            "owner": {"nickname": "sk"},
            "type": "netmera-mobimera:mobimera"
        }
    }"#;

    fn record(transport: &Arc<RecordingTransport>, session: &Session) -> NetmeraContent {
        let dispatcher = transport.dispatcher(ClientConfig::with_api_key("app-key"));
        NetmeraContent::new(dispatcher, session.clone(), "Blog")
    }

    fn offline() -> NetmeraContent {
        record(&RecordingTransport::with_responses(&[]), &Session::new("app-key"))
    }

    #[test]
    fn test_add_rejects_empty_key_and_null() {
        let mut content = offline();

        let err = content.add("", "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequiredField);
        let err = content.add("title", Value::Null).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequiredField);

        assert!(content.data().is_empty());
    }

    #[test]
    fn test_add_replaces_value() {
        let mut content = offline();
        content.add("title", "first").unwrap();
        content.add("title", "second").unwrap();
        assert_eq!(content.get_string("title"), Some("second"));
    }

    #[test]
    fn test_typed_getters_fall_back() {
        let mut content = offline();
        content.add("title", "Hello").unwrap();
        content.add("likes", 3).unwrap();
        content.add("draft", true).unwrap();
        content.add("tags", vec![json!("a")]).unwrap();
        content.add("meta", json!({"k": 1})).unwrap();

        assert_eq!(content.get_number("likes"), 3.0);
        assert_eq!(content.get_number("title"), 0.0);
        assert!(content.get_boolean("draft"));
        assert!(!content.get_boolean("likes"));
        assert_eq!(content.get_string("likes"), None);
        assert_eq!(content.get_json_array("tags").map(Vec::len), Some(1));
        assert!(content.get_json_array("meta").is_none());
        assert!(content.get_json_object("meta").is_some());
        assert!(content.get_json_object("tags").is_none());
        assert!(content.get("missing").is_none());
        assert!(content.get_geo_location("missing").is_none());
    }

    #[test]
    fn test_geo_location_expands() {
        let mut content = offline();
        content.add("place", GeoLocation::new(41.0, 29.5)).unwrap();

        assert_eq!(content.get_string("place_netmera_mobile_loc"), Some("41,29.5"));
        assert_eq!(content.get_number("place_netmera_mobile_latitude"), 41.0);
        assert_eq!(content.get_number("place_netmera_mobile_longitude"), 29.5);
        assert_eq!(content.get_geo_location("place"), Some(GeoLocation::new(41.0, 29.5)));
        assert_eq!(content.data().len(), 3);
        assert!(content.get("place").is_none());
    }

    #[test]
    fn test_geo_location_at_origin() {
        let mut content = offline();
        content.add("place", GeoLocation::new(0.0, 0.0)).unwrap();
        assert_eq!(content.get_geo_location("place"), Some(GeoLocation::new(0.0, 0.0)));
    }

    #[tokio::test]
    async fn test_create_gates_then_posts() {
        let transport = RecordingTransport::with_responses(&[TOKEN_OK, SAVED]);
        let mut content = record(&transport, &Session::new("app-key"));
        content.add("title", "Hello").unwrap();

        content.create().await.unwrap();

        assert_eq!(transport.calls(), 2);
        let gate = transport.request(0);
        assert_eq!(gate.method, Method::Get);
        assert_eq!(gate.query_value("path"), Some("/mobimeracontents"));
        assert_eq!(gate.query_value("action"), Some("netmera-mobimera:create-mobimera"));

        let create = transport.request(1);
        assert_eq!(create.method, Method::Post);
        assert!(create.url.ends_with("/content/createContent"));
        let keys: Vec<&str> = create.query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["st", "contentActionToken", "path", "contentType", "contentName", "content"]
        );
        assert_eq!(create.query_value("contentActionToken"), Some("act-1"));
        assert_eq!(create.query_value("contentType"), Some("netmera-mobimera:mobimera"));
        let name: u32 = create.query_value("contentName").unwrap().parse().unwrap();
        assert!((1..=1000).contains(&name));

        let sent: Value = serde_json::from_str(create.query_value("content").unwrap()).unwrap();
        assert_eq!(sent["title"], "Hello");
        assert_eq!(sent["netmera-mobimera:api-content-type"], "Blog");

        assert_eq!(content.path(), Some("/mobimeracontents/42"));
        assert_eq!(content.privacy(), Some("public"));
        assert_eq!(content.moderation_status(), Some("production"));
        assert_eq!(content.content_type(), Some("netmera-mobimera:mobimera"));
        assert_eq!(content.owner().unwrap()["nickname"], "sk");
    }

    #[tokio::test]
    async fn test_create_without_action_token_sends_nothing_else() {
        let transport = RecordingTransport::with_responses(&[r#"{"entry": {}}"#]);
        let mut content = record(&transport, &Session::new("app-key"));
        content.add("title", "Hello").unwrap();

        let err = content.create().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Io);
        assert_eq!(transport.calls(), 1);
        assert!(content.path().is_none());
    }

    #[tokio::test]
    async fn test_create_failure_after_token() {
        let transport = RecordingTransport::with_statuses(&[(200, TOKEN_OK), (500, "")]);
        let mut content = record(&transport, &Session::new("app-key"));
        content.add("title", "Hello").unwrap();

        let err = content.create().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Io);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_update_requires_path() {
        let transport = RecordingTransport::with_responses(&[]);
        let mut content = record(&transport, &Session::new("app-key"));

        let err = content.update().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequiredField);
        assert!(err.is_local());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_gates_on_record_path() {
        let transport = RecordingTransport::with_responses(&[TOKEN_OK, SAVED]);
        let mut content = record(&transport, &Session::new("app-key"));
        content.set_path("/mobimeracontents/42");
        content.add("title", "Edited").unwrap();

        content.update().await.unwrap();

        let gate = transport.request(0);
        assert_eq!(gate.query_value("path"), Some("/mobimeracontents/42"));
        assert_eq!(gate.query_value("action"), Some("netmera-mobimera:update-mobimera"));

        let update = transport.request(1);
        assert!(update.url.ends_with("/content/updateContent"));
        let keys: Vec<&str> = update.query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "st",
                "contentActionToken",
                "contentPrivacy",
                "moderationStatus",
                "path",
                "contentType",
                "contentName",
                "content"
            ]
        );
        assert_eq!(update.query_value("contentPrivacy"), Some("public"));
        assert_eq!(update.query_value("path"), Some("/mobimeracontents/42"));
        assert_eq!(content.get_string("title"), Some("Hello"));
    }

    #[tokio::test]
    async fn test_delete_clears_state() {
        let transport = RecordingTransport::with_responses(&[r#"{"entry": {}}"#]);
        let mut content = record(&transport, &Session::new("app-key"));
        content.set_path("/mobimeracontents/42");
        content.add("title", "Hello").unwrap();

        content.delete().await.unwrap();

        let request = transport.request(0);
        assert!(request.url.ends_with("/content/deleteContent"));
        assert_eq!(request.query_value("path"), Some("/mobimeracontents/42"));
        assert!(content.path().is_none());
        assert!(content.data().is_empty());
        assert_eq!(content.object_name(), "Blog");
    }

    #[tokio::test]
    async fn test_owner_token_used_after_set_owner() {
        let session = Session::new("app-key");
        let transport = RecordingTransport::with_responses(&[TOKEN_OK, SAVED]);
        let mut content = record(&transport, &session);

        assert_eq!(content.set_owner().unwrap_err().code(), ErrorCode::UserLoginError);

        session.login(Some("user-token".into()), UserProfile::default());
        content.set_owner().unwrap();
        content.add("title", "Mine").unwrap();
        content.create().await.unwrap();

        assert_eq!(transport.request(0).query_value("st"), Some("user-token"));
        assert_eq!(transport.request(1).query_value("st"), Some("user-token"));
    }
}
