//! History loader for the HTTP history service (native).

use super::{
    BoxFuture, HistoryError, HistoryLoader, HistoryResult, assemble, chats_url, movements_url,
};
use crate::shapes::Shape;

/// Loads room history from `{base_url}/chats/{room}` and
/// `{base_url}/shapeMovements/{room}` with blocking requests.
#[derive(Debug, Clone)]
pub struct HttpHistoryLoader {
    base_url: String,
    token: Option<String>,
}

impl HttpHistoryLoader {
    /// Create a loader for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Send `token` as the `Authorization` header.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> HistoryResult<String> {
        log::debug!("GET {url}");
        let mut request = ureq::get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", token);
        }

        let mut response = request.call().map_err(|e| match e {
            ureq::Error::StatusCode(status) => HistoryError::Status {
                url: url.to_string(),
                status,
            },
            other => HistoryError::Request {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| HistoryError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

impl HistoryLoader for HttpHistoryLoader {
    fn load(&self, room_id: &str) -> BoxFuture<'_, HistoryResult<Vec<Shape>>> {
        let chats = chats_url(&self.base_url, room_id);
        let movements = movements_url(&self.base_url, room_id);
        Box::pin(async move {
            let chats = self
                .get(&chats)
                .inspect_err(|e| log::error!("Failed to load chat history: {e}"))?;
            let shapes = assemble(Ok(chats), self.get(&movements))?;
            log::info!("Loaded {} shapes from history", shapes.len());
            Ok(shapes)
        })
    }
}
