//! Typed response values.
//!
//! # Design
//! Most endpoints return free-form JSON that callers inspect themselves, but
//! the login response has a shape the session depends on: it must contain an
//! identifier and a token. `UserInfo` pins that contract down as an explicit
//! struct instead of a loosely-typed map.

use serde::Deserialize;

/// The decoded login response.
///
/// Older server generations call the token field `token`, newer ones
/// `access_token`; both deserialize into [`UserInfo::token`]. Extra fields
/// in the response are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(alias = "access_token")]
    pub token: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_token_field() {
        let info: UserInfo =
            serde_json::from_str(r#"{"id":"7","token":"abc","name":"Pat"}"#).unwrap();
        assert_eq!(info.token, "abc");
        assert_eq!(info.id, "7");
        assert_eq!(info.name.as_deref(), Some("Pat"));
    }

    #[test]
    fn decodes_access_token_alias() {
        let info: UserInfo = serde_json::from_str(r#"{"id":"7","access_token":"xyz"}"#).unwrap();
        assert_eq!(info.token, "xyz");
        assert!(info.email.is_none());
    }

    #[test]
    fn missing_token_is_an_error() {
        let result: Result<UserInfo, _> = serde_json::from_str(r#"{"id":"7"}"#);
        assert!(result.is_err());
    }
}
