use reqwest::{Method, Response, StatusCode};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the outbound client stack.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The transport itself failed; no usable response exists.
    #[error("could not process request, got ({0})")]
    Transport(#[source] BoxError),

    /// A wrapped transport failed while a status check was pending.
    #[error("could not process request to check status, got ({0})")]
    StatusCheck(#[source] Box<ClientError>),

    /// The round trip succeeded but returned a status outside the
    /// allow-list for its method. The response rides along un-consumed so
    /// the caller can still inspect or drain it.
    #[error("({status}), is not an acceptable status for method ({method})")]
    DisallowedStatus {
        status: StatusCode,
        method: Method,
        response: Box<Response>,
    },
}

impl ClientError {
    /// The response attached to the error, if the round trip produced one.
    pub fn into_response(self) -> Option<Response> {
        match self {
            ClientError::DisallowedStatus { response, .. } => Some(*response),
            _ => None,
        }
    }

    /// The offending status code, if the round trip produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::DisallowedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canned_response(status: StatusCode) -> Response {
        let inner = http::Response::builder()
            .status(status)
            .body("")
            .unwrap();
        Response::from(inner)
    }

    #[test]
    fn disallowed_status_message_names_status_and_method() {
        let err = ClientError::DisallowedStatus {
            status: StatusCode::NOT_FOUND,
            method: Method::GET,
            response: Box::new(canned_response(StatusCode::NOT_FOUND)),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"), "message must name the status: {msg}");
        assert!(msg.contains("GET"), "message must name the method: {msg}");
    }

    #[test]
    fn status_check_message_is_distinct_from_disallowed_status() {
        let inner = ClientError::Transport(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        )));
        let err = ClientError::StatusCheck(Box::new(inner));
        assert!(err.to_string().starts_with("could not process request to check status"));
        assert!(!err.to_string().contains("acceptable status"));
    }

    #[test]
    fn into_response_preserves_the_response() {
        let err = ClientError::DisallowedStatus {
            status: StatusCode::BAD_GATEWAY,
            method: Method::POST,
            response: Box::new(canned_response(StatusCode::BAD_GATEWAY)),
        };
        let response = err.into_response().expect("response must survive");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn transport_error_has_no_response() {
        let err = ClientError::Transport(Box::new(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timeout",
        )));
        assert!(err.status().is_none());
        assert!(err.into_response().is_none());
    }
}
