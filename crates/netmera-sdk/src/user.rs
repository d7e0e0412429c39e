//! User accounts: registration, profile updates, activation and login

use crate::session::{Session, UserProfile};
use netmera_client::{
    endpoints, rpc_methods, user_params, Dispatcher, FormRequest, NetmeraError, Result,
    RpcEnvelope, RpcRequest,
};
use serde_json::Value;
use tracing::{debug, info};

/// A user account
#[derive(Clone)]
pub struct NetmeraUser {
    dispatcher: Dispatcher,
    session: Session,
    email: Option<String>,
    password: Option<String>,
    nickname: Option<String>,
    name: Option<String>,
    surname: Option<String>,
}

impl std::fmt::Debug for NetmeraUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetmeraUser")
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("name", &self.name)
            .field("surname", &self.surname)
            .finish_non_exhaustive()
    }
}

impl NetmeraUser {
    pub fn new(dispatcher: Dispatcher, session: Session) -> Self {
        Self {
            dispatcher,
            session,
            email: None,
            password: None,
            nickname: None,
            name: None,
            surname: None,
        }
    }

    /// User built from a people-search entry
    pub(crate) fn from_search_json(dispatcher: Dispatcher, session: Session, json: &Value) -> Self {
        let mut user = Self::new(dispatcher, session);
        user.apply_profile_json(json);
        if let Some(email) = non_empty_str(json, user_params::EMAIL) {
            user.email = Some(email);
        }
        user
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = Some(email.into());
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = Some(nickname.into());
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn surname(&self) -> Option<&str> {
        self.surname.as_deref()
    }

    pub fn set_surname(&mut self, surname: impl Into<String>) {
        self.surname = Some(surname.into());
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            nickname: self.nickname.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
        }
    }

    // ==================== Account Operations ====================

    /// Register this user; email, nickname and password are required
    pub async fn register(&mut self) -> Result<()> {
        let email = required(&self.email, user_params::EMAIL)?;
        let nickname = required(&self.nickname, user_params::NICKNAME)?;
        let password = required(&self.password, user_params::PASSWORD)?;

        let request = FormRequest::post(endpoints::REGISTER_USER, self.session.token())
            .param(user_params::EMAIL, email)
            .param(user_params::NICKNAME, nickname)
            .param(user_params::PASSWORD, password)
            .param_opt(user_params::NAME, self.name.as_deref())
            .param_opt(user_params::SURNAME, self.surname.as_deref());

        let response = self.dispatcher.send(request).await?;
        let entry = response
            .get("entry")
            .filter(|entry| !entry.is_null())
            .ok_or_else(|| NetmeraError::Register("no entry in response".to_string()))?;

        self.apply_profile_json(entry);
        info!(email = ?self.email, "user registered");
        Ok(())
    }

    /// Push profile and/or account changes
    ///
    /// A nickname triggers a profile update; a password triggers an account
    /// update, after the profile update when both are set.
    pub async fn update(&mut self) -> Result<()> {
        match (self.nickname.is_some(), self.password.is_some()) {
            (true, with_password) => {
                let data = self.profile_update().await?;
                self.apply_profile_json(&data);
                if with_password {
                    self.account_update().await?;
                }
            }
            (false, true) => {
                let data = self.account_update().await?;
                self.apply_profile_json(&data);
            }
            (false, false) => {
                return Err(NetmeraError::UserUpdate(
                    "nickname or password must be set".to_string(),
                ))
            }
        }
        info!(email = ?self.email, "user updated");
        Ok(())
    }

    /// Activate the registered account with the given email
    pub async fn activate(&self, email: &str) -> Result<()> {
        if email.is_empty() {
            return Err(NetmeraError::required(user_params::EMAIL));
        }
        let request =
            RpcRequest::new(rpc_methods::ACTIVATE_USER, self.session.token()).param(user_params::EMAIL, email);
        self.rpc(request)
            .await?
            .ok_or_else(|| NetmeraError::UserUpdate("activation rejected".to_string()))?;
        info!(email, "user activated");
        Ok(())
    }

    /// Deactivate the registered account with the given email
    pub async fn deactivate(&self, email: &str) -> Result<()> {
        if email.is_empty() {
            return Err(NetmeraError::required(user_params::EMAIL));
        }
        let request =
            RpcRequest::new(rpc_methods::DEACTIVATE_USER, self.session.token()).param(user_params::EMAIL, email);
        self.rpc(request)
            .await?
            .ok_or_else(|| NetmeraError::Io("deactivation returned no data".to_string()))?;
        info!(email, "user deactivated");
        Ok(())
    }

    /// Log in and install the user into `session`
    pub async fn login(
        dispatcher: &Dispatcher,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        if email.is_empty() {
            return Err(NetmeraError::required(user_params::EMAIL));
        }
        if password.is_empty() {
            return Err(NetmeraError::required(user_params::PASSWORD));
        }

        let request = RpcRequest::new(rpc_methods::LOGIN, session.token())
            .param(user_params::EMAIL, email)
            .param(user_params::PASSWORD, password);
        let envelope: RpcEnvelope = dispatcher.send_rpc_as(request).await?;
        let data = envelope
            .into_data()
            .ok_or_else(|| NetmeraError::Io("login returned no data".to_string()))?;

        let profile = UserProfile {
            email: non_empty_str(&data, user_params::EMAIL),
            nickname: non_empty_str(&data, user_params::NICKNAME),
            name: non_empty_str(&data, user_params::NAME),
            surname: non_empty_str(&data, user_params::SURNAME),
        };
        session.login(non_empty_str(&data, user_params::SECURITY_TOKEN), profile.clone());
        info!(email, "user logged in");
        Ok(profile)
    }

    /// Forget the logged-in user
    pub fn logout(session: &Session) {
        session.logout();
        debug!("user logged out");
    }

    // ==================== Helper Methods ====================

    async fn profile_update(&self) -> Result<Value> {
        let email = required(&self.email, user_params::EMAIL)?;
        let nickname = required(&self.nickname, user_params::NICKNAME)?;

        let request = RpcRequest::new(rpc_methods::PROFILE_UPDATE, self.session.token())
            .param(user_params::EMAIL, email)
            .param(user_params::NICKNAME, nickname)
            .param_opt(user_params::NAME, self.name.as_deref())
            .param_opt(user_params::SURNAME, self.surname.as_deref());

        self.rpc(request)
            .await?
            .ok_or_else(|| NetmeraError::UserUpdate("profile update rejected".to_string()))
    }

    async fn account_update(&self) -> Result<Value> {
        let email = required(&self.email, user_params::EMAIL)?;
        let password = required(&self.password, user_params::PASSWORD)?;

        let request = RpcRequest::new(rpc_methods::ACCOUNT_UPDATE, self.session.token())
            .param(user_params::EMAIL, email)
            .param(user_params::PASSWORD, password)
            .param_opt(user_params::NAME, self.name.as_deref())
            .param_opt(user_params::SURNAME, self.surname.as_deref());

        self.rpc(request)
            .await?
            .ok_or_else(|| NetmeraError::UserUpdate("account update rejected".to_string()))
    }

    async fn rpc(&self, request: RpcRequest) -> Result<Option<Value>> {
        let envelope: RpcEnvelope = self.dispatcher.send_rpc_as(request).await?;
        Ok(envelope.into_data())
    }

    /// Read `emails[0].value`, `nickname` and `name.{givenName,familyName}`
    fn apply_profile_json(&mut self, json: &Value) {
        if let Some(email) = json
            .get(user_params::EMAILS)
            .and_then(|emails| emails.get(0))
            .and_then(|first| non_empty_str(first, user_params::EMAIL_VALUE))
        {
            self.email = Some(email);
        }
        if let Some(nickname) = non_empty_str(json, user_params::NICKNAME) {
            self.nickname = Some(nickname);
        }
        if let Some(name) = json.get(user_params::NAME) {
            if let Some(given) = non_empty_str(name, user_params::GIVEN_NAME) {
                self.name = Some(given);
            }
            if let Some(family) = non_empty_str(name, user_params::FAMILY_NAME) {
                self.surname = Some(family);
            }
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| NetmeraError::required(field))
}

fn non_empty_str(json: &Value, key: &str) -> Option<String> {
    json.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
