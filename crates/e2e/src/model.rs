//! API payloads exchanged with the club administration backend

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Credentials;

/// Body of `POST /api/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl RegisterUser {
    pub fn new(credentials: &Credentials, roles: &[String]) -> Self {
        Self {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
            roles: roles.to_vec(),
        }
    }
}

/// Body returned by `POST .../category-type/create`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryType {
    #[serde(default)]
    pub id: Value,

    pub name: String,

    #[serde(default)]
    pub root: Option<bool>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl CategoryType {
    /// Check the fields every creation response must carry
    pub fn validate_created(&self, expected_name: &str) -> E2eResult<()> {
        if self.name != expected_name {
            return Err(E2eError::AssertionFailed(format!(
                "created category name: expected '{}', got '{}'",
                expected_name, self.name
            )));
        }
        if !is_truthy(&self.id) {
            return Err(E2eError::AssertionFailed(format!(
                "created category '{}' has no id (got {})",
                self.name, self.id
            )));
        }
        Ok(())
    }

    pub fn expect_root(&self) -> E2eResult<()> {
        match self.root {
            Some(true) => Ok(()),
            other => Err(E2eError::AssertionFailed(format!(
                "category '{}' should be a root category, root = {:?}",
                self.name, other
            ))),
        }
    }
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_payload_shape() {
        let credentials = Credentials {
            email: "email+x@playwrite.com".into(),
            password: "password+x".into(),
        };
        let body = RegisterUser::new(&credentials, &["ROLE_ADMIN".to_string()]);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "email": "email+x@playwrite.com",
                "password": "password+x",
                "roles": ["ROLE_ADMIN"],
            })
        );
    }

    #[test]
    fn test_root_category_response_validates() {
        let body: CategoryType = serde_json::from_value(json!({
            "id": 4182,
            "name": "category+ab12cd34",
            "root": true,
            "parentId": null,
        }))
        .unwrap();
        body.validate_created("category+ab12cd34").unwrap();
        body.expect_root().unwrap();
        assert!(body.extra.contains_key("parentId"));
    }

    #[test]
    fn test_sub_category_is_not_root() {
        let body: CategoryType = serde_json::from_value(json!({
            "id": "c0ffee",
            "name": "sub-category+ab12cd34",
            "root": false,
        }))
        .unwrap();
        body.validate_created("sub-category+ab12cd34").unwrap();
        assert!(body.expect_root().is_err());
    }

    #[test]
    fn test_name_mismatch_and_missing_id_fail() {
        let body: CategoryType =
            serde_json::from_value(json!({ "id": 0, "name": "other" })).unwrap();
        assert!(body.validate_created("category+1").is_err());

        let body: CategoryType =
            serde_json::from_value(json!({ "name": "category+1" })).unwrap();
        assert!(body.validate_created("category+1").is_err());
    }

    #[test]
    fn test_truthiness_follows_javascript() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(7)));
        assert!(is_truthy(&json!("7")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
