//! History loader using the browser fetch API (WASM).

use super::{
    BoxFuture, HistoryError, HistoryLoader, HistoryResult, assemble, chats_url, movements_url,
};
use crate::shapes::Shape;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Loads room history from the history service with `window.fetch`.
#[derive(Debug, Clone)]
pub struct FetchHistoryLoader {
    base_url: String,
    token: Option<String>,
}

impl FetchHistoryLoader {
    /// Create a loader for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Send `token` as the `Authorization` header.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    async fn get(&self, url: &str) -> HistoryResult<String> {
        let failed = |e: JsValue| HistoryError::Request {
            url: url.to_string(),
            message: format!("{e:?}"),
        };

        let window = web_sys::window()
            .ok_or_else(|| HistoryError::Unavailable("no window".to_string()))?;

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(url, &opts).map_err(failed)?;
        if let Some(token) = &self.token {
            request
                .headers()
                .set("Authorization", token)
                .map_err(failed)?;
        }

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(failed)?;
        let response: Response = value.dyn_into().map_err(failed)?;
        if !response.ok() {
            return Err(HistoryError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let text = JsFuture::from(response.text().map_err(failed)?)
            .await
            .map_err(failed)?;
        text.as_string()
            .ok_or_else(|| HistoryError::Unavailable(format!("{url} returned a non-text body")))
    }
}

impl HistoryLoader for FetchHistoryLoader {
    fn load(&self, room_id: &str) -> BoxFuture<'_, HistoryResult<Vec<Shape>>> {
        let chats = chats_url(&self.base_url, room_id);
        let movements = movements_url(&self.base_url, room_id);
        Box::pin(async move {
            let chats = self
                .get(&chats)
                .await
                .inspect_err(|e| log::error!("Failed to load chat history: {e}"))?;
            let shapes = assemble(Ok(chats), self.get(&movements).await)?;
            log::info!("Loaded {} shapes from history", shapes.len());
            Ok(shapes)
        })
    }
}
