//! Wire types for the Netmera REST and RPC endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query parameter names
pub mod params {
    pub const CONTENT_ACTION_TOKEN: &str = "contentActionToken";
    pub const PATH: &str = "path";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const CONTENT_NAME: &str = "contentName";
    pub const CONTENT: &str = "content";
    pub const MAX: &str = "max";
    pub const PAGE: &str = "page";
    pub const CUSTOM_CONDITION: &str = "customCondition";
    pub const SEARCH_TEXT: &str = "searchText";
    pub const SORT_BY: &str = "sortBy";
    pub const SORT_ORDER: &str = "sortOrder";
    pub const CONTENT_PRIVACY: &str = "contentPrivacy";
    pub const MODERATION_STATUS: &str = "moderationStatus";
    pub const SEARCH_TYPE: &str = "searchType";
    pub const FIELD_NAME: &str = "fieldName";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const DISTANCE: &str = "distance";
    pub const SERVICE: &str = "service";
    pub const ACTION: &str = "action";
    pub const SECURITY_TOKEN: &str = "st";

    pub const LOCATION_SUFFIX: &str = "_netmera_mobile_loc";
    pub const LATITUDE_SUFFIX: &str = "_netmera_mobile_latitude";
    pub const LONGITUDE_SUFFIX: &str = "_netmera_mobile_longitude";
}

/// User field names shared by the register form and the RPC payloads
pub mod user_params {
    pub const EMAIL: &str = "email";
    pub const EMAILS: &str = "emails";
    pub const EMAIL_VALUE: &str = "value";
    pub const PASSWORD: &str = "password";
    pub const NICKNAME: &str = "nickname";
    pub const NAME: &str = "name";
    pub const GIVEN_NAME: &str = "givenName";
    pub const FAMILY_NAME: &str = "familyName";
    pub const SURNAME: &str = "surname";
    pub const SECURITY_TOKEN: &str = "st";
}

/// REST method paths, relative to `/social/rest`
pub mod endpoints {
    pub const ACTION_TOKEN: &str = "/content/createActionToken";
    pub const CREATE_CONTENT: &str = "/content/createContent";
    pub const UPDATE_CONTENT: &str = "/content/updateContent";
    pub const DELETE_CONTENT: &str = "/content/deleteContent";
    pub const SEARCH_CONTENT: &str = "/content/search";
    pub const GET_CONTENT: &str = "/content/get";
    pub const LOCATION_SEARCH: &str = "/content/locationSearch";
    pub const REGISTER_USER: &str = "/site/register";
    pub const PEOPLE_SEARCH: &str = "/people/search";
}

/// RPC method names sent through `/social/rpc`
pub mod rpc_methods {
    pub const LOGIN: &str = "site.login";
    pub const ACTIVATE_USER: &str = "site.activateUser";
    pub const DEACTIVATE_USER: &str = "site.deactivateUser";
    pub const PROFILE_UPDATE: &str = "people.profileUpdate";
    pub const ACCOUNT_UPDATE: &str = "people.accountUpdate";
}

/// One stored content item as the server returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub content: EntryContent,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryContent {
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub privacy_type_name: Option<String>,
    #[serde(default)]
    pub moderation_status: Option<String>,
}

/// Envelope for single-entry endpoints (get, create, update)
#[derive(Debug, Clone, Deserialize)]
pub struct EntryEnvelope {
    #[serde(default)]
    pub entry: Option<Entry>,
}

/// Envelope for search endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SearchEnvelope<T = Entry> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub entry: Vec<T>,
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope for the action token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ActionTokenEnvelope {
    #[serde(default)]
    pub entry: Option<ActionTokenEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionTokenEntry {
    #[serde(default)]
    pub key: Option<String>,
}

/// Envelope for RPC calls; absent `data` signals failure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcEnvelope {
    /// `data` when present and not null
    pub fn into_data(self) -> Option<Value> {
        self.data.filter(|data| !data.is_null())
    }
}
