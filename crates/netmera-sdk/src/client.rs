//! Client context tying configuration, transport and session together

use crate::content::NetmeraContent;
use crate::service::NetmeraService;
use crate::session::{Session, UserProfile};
use crate::user::NetmeraUser;
use netmera_client::{BackendProfile, ClientConfig, Dispatcher, Result, Transport};
use std::sync::Arc;
use tracing::info;

/// Entry point of the SDK
///
/// Services, records and users created from one client share its dispatcher
/// and session, so a login through the client is visible to all of them.
///
/// # Example
///
/// ```rust,no_run
/// use netmera_sdk::{NetmeraClient, SortOrder};
///
/// # async fn example() -> netmera_sdk::Result<()> {
/// let client = NetmeraClient::init("my-api-key")?;
///
/// let mut post = client.content("BlogEntries");
/// post.add("title", "Hello")?;
/// post.create().await?;
///
/// let mut query = client.service("BlogEntries");
/// query.set_sort_by("creationdate").set_sort_order(SortOrder::Descending);
/// for entry in query.search().await? {
///     println!("{:?}", entry.get_string("title"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NetmeraClient {
    dispatcher: Dispatcher,
    session: Session,
}

impl NetmeraClient {
    /// Client with the default backend and the given API key
    pub fn init(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::with_api_key(api_key))
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        let session = Session::new(config.api_key.clone());
        let dispatcher = Dispatcher::new(config)?;
        info!(base_url = %dispatcher.config().origin(), "netmera client initialised");
        Ok(Self { dispatcher, session })
    }

    /// Client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let session = Session::new(config.api_key.clone());
        Self {
            dispatcher: Dispatcher::with_transport(config, transport),
            session,
        }
    }

    /// Query service for `object_name` records
    pub fn service(&self, object_name: impl Into<String>) -> NetmeraService {
        NetmeraService::new(self.dispatcher.clone(), self.session.clone(), object_name)
    }

    /// Query service for user searches
    pub fn user_service(&self) -> NetmeraService {
        NetmeraService::new(self.dispatcher.clone(), self.session.clone(), String::new())
    }

    /// New, unsaved `object_name` record
    pub fn content(&self, object_name: impl Into<String>) -> NetmeraContent {
        NetmeraContent::new(self.dispatcher.clone(), self.session.clone(), object_name)
    }

    /// New user account, not yet registered
    pub fn user(&self) -> NetmeraUser {
        NetmeraUser::new(self.dispatcher.clone(), self.session.clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        NetmeraUser::login(&self.dispatcher, &self.session, email, password).await
    }

    pub fn logout(&self) {
        NetmeraUser::logout(&self.session);
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn profile(&self) -> &BackendProfile {
        &self.dispatcher.config().profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;

    #[tokio::test]
    async fn test_login_is_shared_with_services() {
        let transport = RecordingTransport::with_responses(&[
            r#"{"data": {"st": "user-token", "email": "ada@example.com"}}"#,
            r#"{"entry": [], "totalResults": 0}"#,
        ]);
        let client = NetmeraClient::with_transport(ClientConfig::with_api_key("app-key"), transport.clone());
        let mut query = client.service("Blog");
        assert!(query.where_owner_equal().is_err());

        client.login("ada@example.com", "secret").await.unwrap();
        assert_eq!(
            client.current_user().and_then(|user| user.email),
            Some("ada@example.com".to_string())
        );

        query.where_owner_equal().unwrap();
        query.search().await.unwrap();
        assert_eq!(transport.request(1).query_value("st"), Some("user-token"));

        client.logout();
        assert!(client.current_user().is_none());
        assert!(!client.session().is_logged_in());
    }

    #[test]
    fn test_factories_bind_kind() {
        let transport = RecordingTransport::with_responses(&[]);
        let client = NetmeraClient::with_transport(ClientConfig::with_api_key("app-key"), transport);

        assert_eq!(client.content("Blog").object_name(), "Blog");
        assert_eq!(client.service("Blog").object_name(), "Blog");
        assert_eq!(client.profile().people_path, "/people");
        assert_eq!(client.session().token(), "app-key");
    }
}
