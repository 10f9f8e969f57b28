//! Gateway wire types
//!
//! Request and response bodies exchanged with the token-issuance endpoint
//! and the Gmail API. Only the fields the gateway writes or must read are
//! modelled; everything else passes through as raw JSON.

use serde::{Deserialize, Serialize};

/// Successful response from the token-issuance endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// Downstream bearer credential
    pub access_token: String,
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Raw RFC 822 message (base64url encoded)
    pub raw: String,
}

/// Request to create a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// The message
    pub message: SendMessageRequest,
}

/// Request to modify message labels
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModifyMessageRequest {
    /// Label IDs to add
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_label_ids: Option<Vec<String>>,

    /// Label IDs to remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_label_ids: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_response_deserialize() {
        let json = r#"{"accessToken":"ya29.token"}"#;
        let resp: AccessTokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "ya29.token");
    }

    #[test]
    fn test_access_token_response_rejects_other_shapes() {
        assert!(serde_json::from_str::<AccessTokenResponse>(r#"{"token":"x"}"#).is_err());
        assert!(serde_json::from_str::<AccessTokenResponse>(r#"{"accessToken":42}"#).is_err());
        assert!(serde_json::from_str::<AccessTokenResponse>(r#""just a string""#).is_err());
    }

    #[test]
    fn test_modify_request_omits_absent_lists() {
        let json = serde_json::to_string(&ModifyMessageRequest::default()).unwrap();
        assert_eq!(json, "{}");

        let req = ModifyMessageRequest {
            add_label_ids: Some(vec!["STARRED".to_string()]),
            remove_label_ids: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"addLabelIds":["STARRED"]}"#);
    }

    #[test]
    fn test_draft_request_wraps_message() {
        let req = CreateDraftRequest {
            message: SendMessageRequest {
                raw: "abc".to_string(),
            },
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"message":{"raw":"abc"}}"#);
    }
}
