//! Error types for the Netmera client

use thiserror::Error;

/// Integer error codes reported by every Netmera failure
///
/// Codes are grouped by category: general/transport (1xx), data (13x),
/// user/account (15x), geolocation (17x) and JSON access (19x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    InternalServerError = 100,
    Io = 101,
    Null = 102,
    HttpProtocol = 103,
    InvalidUrl = 104,
    InvalidJson = 105,
    InvalidDateFormat = 106,
    InvalidRequest = 107,
    InvalidResponse = 108,
    UnsupportedEncoding = 109,
    InvalidActionToken = 110,

    RequiredField = 131,
    InvalidDataType = 132,
    InvalidKey = 133,
    InvalidPath = 134,
    InvalidObjectName = 135,

    InvalidEmail = 151,
    InvalidPassword = 152,
    AlreadyRegisteredEmail = 153,
    UserLoginError = 154,
    UserRegisterError = 155,
    UserUpdateError = 156,

    InvalidLatitude = 171,
    InvalidLongitude = 172,

    JsonPut = 191,
    JsonGet = 192,
}

impl ErrorCode {
    /// Numeric value of the code
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Netmera client error
#[derive(Debug, Error)]
pub enum NetmeraError {
    /// Transport failed, the server answered non-200, or the answer was empty
    #[error("Cannot connect to the server: {0}")]
    Io(String),

    /// Response body was not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Response parsed but did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be built (bad URL, unsupported method)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A required field or argument is missing
    #[error("{0} is required")]
    RequiredField(String),

    /// Operation needs a logged-in user
    #[error("No user is logged in")]
    NotLoggedIn,

    /// Login call was rejected
    #[error("User login failed: {0}")]
    Login(String),

    /// Registration call was rejected
    #[error("User registration failed: {0}")]
    Register(String),

    /// Profile or account update was rejected
    #[error("User update failed: {0}")]
    UserUpdate(String),
}

impl NetmeraError {
    /// Error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            NetmeraError::Io(_) => ErrorCode::Io,
            NetmeraError::InvalidJson(_) => ErrorCode::InvalidJson,
            NetmeraError::InvalidResponse(_) => ErrorCode::InvalidResponse,
            NetmeraError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            NetmeraError::RequiredField(_) => ErrorCode::RequiredField,
            NetmeraError::NotLoggedIn => ErrorCode::UserLoginError,
            NetmeraError::Login(_) => ErrorCode::UserLoginError,
            NetmeraError::Register(_) => ErrorCode::UserRegisterError,
            NetmeraError::UserUpdate(_) => ErrorCode::UserUpdateError,
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// True for validation failures raised before any request is sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            NetmeraError::RequiredField(_)
                | NetmeraError::NotLoggedIn
                | NetmeraError::InvalidRequest(_)
        )
    }

    pub fn required(field: impl Into<String>) -> Self {
        NetmeraError::RequiredField(field.into())
    }
}

impl From<reqwest::Error> for NetmeraError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            NetmeraError::InvalidRequest(e.to_string())
        } else {
            NetmeraError::Io(e.to_string())
        }
    }
}

/// Result type for Netmera operations
pub type Result<T> = std::result::Result<T, NetmeraError>;
