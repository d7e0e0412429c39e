//! Query service for content records and users
//!
//! A [`NetmeraService`] accumulates filters, paging and sorting for one object
//! kind, then runs a keyword/condition search, a count, a single-record get or
//! a location search. Filters only ever accumulate; build a new service for a
//! fresh query.

use crate::condition::{Clause, CompareOp, ConditionBuilder, Pattern};
use crate::content::NetmeraContent;
use crate::geo::GeoLocation;
use crate::session::Session;
use crate::user::NetmeraUser;
use netmera_client::{
    endpoints, params, Dispatcher, EntryEnvelope, FormRequest, NetmeraError, Result,
    SearchEnvelope,
};
use serde_json::Value;
use tracing::debug;

const DEFAULT_MAX: u32 = 10;

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

enum LocationQuery {
    Box(GeoLocation, GeoLocation),
    Circle(GeoLocation, f64),
}

/// Query builder and executor for one object kind
#[derive(Clone)]
pub struct NetmeraService {
    dispatcher: Dispatcher,
    session: Session,
    object_name: String,
    condition: ConditionBuilder,
    search_text: Option<String>,
    max: u32,
    page: u32,
    path: Option<String>,
    sort_by: Option<String>,
    sort_order: SortOrder,
    has_owner: bool,
}

impl std::fmt::Debug for NetmeraService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetmeraService")
            .field("object_name", &self.object_name)
            .field("condition", &self.condition)
            .field("max", &self.max)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl NetmeraService {
    pub fn new(dispatcher: Dispatcher, session: Session, object_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            session,
            object_name: object_name.into(),
            condition: ConditionBuilder::new(),
            search_text: None,
            max: DEFAULT_MAX,
            page: 0,
            path: None,
            sort_by: None,
            sort_order: SortOrder::default(),
            has_owner: false,
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    // ==================== Filters ====================

    pub fn where_equal(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.condition.push(Clause::Equals {
            field: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn where_greater_than(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.compare(key, CompareOp::GreaterThan, value)
    }

    pub fn where_less_than(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.compare(key, CompareOp::LessThan, value)
    }

    pub fn where_not_equal(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.compare(key, CompareOp::NotEqual, value)
    }

    pub fn where_greater_than_or_equal(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.compare(key, CompareOp::GreaterThanOrEqual, value)
    }

    pub fn where_less_than_or_equal(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.compare(key, CompareOp::LessThanOrEqual, value)
    }

    pub fn where_exists(&mut self, key: impl Into<String>, exists: bool) -> &mut Self {
        self.condition.push(Clause::Exists {
            field: key.into(),
            exists,
        });
        self
    }

    /// Match `key` against a regular expression, written without delimiters
    pub fn where_matches(&mut self, key: impl Into<String>, regex: impl Into<String>) -> &mut Self {
        self.matches(key, Pattern::Regex(regex.into()))
    }

    pub fn where_starts_with(&mut self, key: impl Into<String>, prefix: impl Into<String>) -> &mut Self {
        self.matches(key, Pattern::StartsWith(prefix.into()))
    }

    pub fn where_ends_with(&mut self, key: impl Into<String>, suffix: impl Into<String>) -> &mut Self {
        self.matches(key, Pattern::EndsWith(suffix.into()))
    }

    /// `key` equals any of `values`
    pub fn where_contained_in<V: Into<Value>>(
        &mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.contained_in(key, values, false)
    }

    /// `key` contains all of `values`
    pub fn where_all_contained_in<V: Into<Value>>(
        &mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.contained_in(key, values, true)
    }

    /// Restrict results to records owned by the logged-in user
    pub fn where_owner_equal(&mut self) -> Result<&mut Self> {
        self.session.require_login()?;
        self.has_owner = true;
        Ok(self)
    }

    // ==================== Configuration ====================

    pub fn add_search_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn set_sort_by(&mut self, field: impl Into<String>) -> &mut Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> &mut Self {
        self.sort_order = order;
        self
    }

    /// Page size; zero or negative resets to 10
    pub fn set_max(&mut self, max: i64) -> &mut Self {
        self.max = if max <= 0 {
            DEFAULT_MAX
        } else {
            u32::try_from(max).unwrap_or(u32::MAX)
        };
        self
    }

    /// Zero-based page index; negative clamps to 0
    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.page = u32::try_from(page.max(0)).unwrap_or(u32::MAX);
        self
    }

    /// Record path used by [`get`](Self::get)
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Condition string sent as `customCondition`
    pub fn condition(&self) -> String {
        self.condition
            .build(&self.dispatcher.config().profile.type_field, &self.object_name)
    }

    // ==================== Queries ====================

    /// Run the query and return one page of records
    pub async fn search(&self) -> Result<Vec<NetmeraContent>> {
        let envelope: SearchEnvelope = self
            .dispatcher
            .send_as(self.search_request(self.page, self.max)?)
            .await?;
        debug!(kind = %self.object_name, found = envelope.entry.len(), "search finished");
        Ok(self.hydrate(envelope))
    }

    /// Total number of records matching the query
    pub async fn count(&self) -> Result<u64> {
        let envelope: SearchEnvelope = self.dispatcher.send_as(self.search_request(0, 1)?).await?;
        Ok(envelope.total_results)
    }

    /// Fetch the single record at [`path`](Self::path)
    pub async fn get(&self) -> Result<NetmeraContent> {
        let path = self.path.as_deref().ok_or_else(|| NetmeraError::required("path"))?;
        let request = FormRequest::get(endpoints::GET_CONTENT, self.token()?).param(params::PATH, path);

        let envelope: EntryEnvelope = self.dispatcher.send_as(request).await?;
        let entry = envelope
            .entry
            .ok_or_else(|| NetmeraError::Io("entry missing from response".to_string()))?;
        Ok(NetmeraContent::from_entry(
            self.dispatcher.clone(),
            self.session.clone(),
            &self.object_name,
            entry,
        ))
    }

    /// Records whose `field` location lies in the box spanned by two corners
    pub async fn box_search(
        &self,
        corner1: GeoLocation,
        corner2: GeoLocation,
        field: &str,
    ) -> Result<Vec<NetmeraContent>> {
        self.location_search(LocationQuery::Box(corner1, corner2), field).await
    }

    /// Records whose `field` location lies within `distance` of `center`
    pub async fn circle_search(
        &self,
        center: GeoLocation,
        distance: f64,
        field: &str,
    ) -> Result<Vec<NetmeraContent>> {
        self.location_search(LocationQuery::Circle(center, distance), field).await
    }

    /// Search users with the accumulated filters
    pub async fn search_user(&self) -> Result<Vec<NetmeraUser>> {
        let profile = &self.dispatcher.config().profile;
        let request = FormRequest::post(endpoints::PEOPLE_SEARCH, self.token()?)
            .param(params::PATH, &profile.people_path)
            .param(params::CUSTOM_CONDITION, self.condition.build_untyped())
            .param_opt(params::SEARCH_TEXT, self.search_text())
            .param(params::MAX, self.max)
            .param(params::PAGE, self.page);

        let envelope: SearchEnvelope<Value> = self.dispatcher.send_as(request).await?;
        Ok(envelope
            .entry
            .iter()
            .map(|json| {
                NetmeraUser::from_search_json(self.dispatcher.clone(), self.session.clone(), json)
            })
            .collect())
    }

    // ==================== Helper Methods ====================

    fn compare(&mut self, key: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> &mut Self {
        self.condition.compare(key, op, value.into());
        self
    }

    fn matches(&mut self, key: impl Into<String>, pattern: Pattern) -> &mut Self {
        self.condition.push(Clause::Matches {
            field: key.into(),
            pattern,
        });
        self
    }

    fn contained_in<V: Into<Value>>(
        &mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        all: bool,
    ) -> &mut Self {
        self.condition.push(Clause::ContainedIn {
            field: key.into(),
            values: values.into_iter().map(Into::into).collect(),
            all,
        });
        self
    }

    fn token(&self) -> Result<String> {
        self.session.token_for(self.has_owner)
    }

    fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref().filter(|text| !text.is_empty())
    }

    fn search_request(&self, page: u32, max: u32) -> Result<FormRequest> {
        let profile = &self.dispatcher.config().profile;
        let request = FormRequest::post(endpoints::SEARCH_CONTENT, self.token()?)
            .param(params::PATH, &profile.parent_path)
            .param(params::CONTENT_TYPE, &profile.content_type)
            .param(params::CUSTOM_CONDITION, self.condition())
            .param_opt(params::SEARCH_TEXT, self.search_text())
            .param(params::MAX, max)
            .param(params::PAGE, page);

        // Free-text search ignores sorting and sends both sort fields empty.
        let request = if self.search_text().is_some() {
            request.param(params::SORT_BY, "").param(params::SORT_ORDER, "")
        } else {
            request
                .param_opt(params::SORT_BY, self.sort_by.as_deref())
                .param(params::SORT_ORDER, self.sort_order)
        };
        Ok(request)
    }

    async fn location_search(&self, query: LocationQuery, field: &str) -> Result<Vec<NetmeraContent>> {
        let profile = &self.dispatcher.config().profile;
        let request = FormRequest::post(endpoints::LOCATION_SEARCH, self.token()?);

        let request = match query {
            LocationQuery::Box(corner1, corner2) => request
                .param(params::SEARCH_TYPE, "box")
                .param(params::FIELD_NAME, format!("{}{}", field, params::LOCATION_SUFFIX))
                .param(
                    params::LATITUDE,
                    format!("{},{}", corner1.latitude(), corner2.latitude()),
                )
                .param(
                    params::LONGITUDE,
                    format!("{},{}", corner1.longitude(), corner2.longitude()),
                ),
            LocationQuery::Circle(center, distance) => request
                .param(params::SEARCH_TYPE, "circle")
                .param(params::FIELD_NAME, format!("{}{}", field, params::LOCATION_SUFFIX))
                .param(params::LATITUDE, center.latitude())
                .param(params::LONGITUDE, center.longitude())
                .param(params::DISTANCE, distance),
        };

        let request = request
            .param(params::PATH, &profile.parent_path)
            .param(params::CONTENT_TYPE, &profile.content_type)
            .param(params::CUSTOM_CONDITION, self.condition())
            .param_opt(params::SEARCH_TEXT, self.search_text())
            .param(params::MAX, self.max)
            .param(params::PAGE, self.page);

        let envelope: SearchEnvelope = self.dispatcher.send_as(request).await?;
        debug!(kind = %self.object_name, found = envelope.entry.len(), "location search finished");
        Ok(self.hydrate(envelope))
    }

    fn hydrate(&self, envelope: SearchEnvelope) -> Vec<NetmeraContent> {
        envelope
            .entry
            .into_iter()
            .map(|entry| {
                NetmeraContent::from_entry(
                    self.dispatcher.clone(),
                    self.session.clone(),
                    &self.object_name,
                    entry,
                )
            })
            .collect()
    }
}
