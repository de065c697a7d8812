use crate::models::{Block, BlockDraft, BlockLink, BlockPatch, Page};
use crate::storage::{local_storage, TOKEN_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PageRequest {
    pub page_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct BlockIdRequest {
    pub id: String,
}

/// Create-or-update keyed by id; absent fields are left untouched.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UpdateBlockRequest {
    pub id: String,

    #[serde(flatten)]
    pub patch: BlockPatch,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ReorderRequest {
    pub page_id: String,
    pub ordered_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct MoveBlockRequest {
    pub id: String,
    pub page_id: String,
    pub position: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ResolveLinkRequest {
    pub slug: String,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn load_from_storage(base_url: String) -> Self {
        let token = local_storage()
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
            .filter(|t| !t.trim().is_empty());

        Self { base_url, token }
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let req = Self::with_auth_headers(client.post(self.url(path)), self.token.as_deref());

        let res = req.json(body).send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, path))
        }
    }

    /// Like `request_api` but ignores the response body.
    async fn send_api(&self, path: &str, body: &impl serde::Serialize) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req = Self::with_auth_headers(client.post(self.url(path)), self.token.as_deref());

        let res = req.json(body).send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(())
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, path))
        }
    }

    /// Accepts either a bare array or `{ "blocks": [...] }`. Malformed rows are
    /// skipped rather than failing the whole page.
    pub(crate) fn parse_block_list_response(data: serde_json::Value) -> Vec<Block> {
        let list = match data {
            serde_json::Value::Array(xs) => xs,
            other => other
                .get("blocks")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default(),
        };

        let mut out: Vec<Block> = Vec::with_capacity(list.len());
        for item in list {
            match serde_json::from_value::<Block>(item) {
                Ok(b) if !b.id.trim().is_empty() => out.push(b),
                Ok(_) => log::warn!("api: skipping block without id"),
                Err(e) => log::warn!("api: skipping malformed block: {e}"),
            }
        }

        out.sort_by(|a, b| a.position.total_cmp(&b.position));
        out
    }

    /// `{ "block": {...} }` or the block itself.
    pub(crate) fn parse_block_response(data: serde_json::Value) -> ApiResult<Block> {
        let inner = data.get("block").cloned().unwrap_or(data);
        serde_json::from_value::<Block>(inner).map_err(ApiError::parse)
    }

    pub(crate) fn parse_page_list_response(data: serde_json::Value) -> Vec<Page> {
        let list = match data {
            serde_json::Value::Array(xs) => xs,
            other => other
                .get("pages")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default(),
        };

        list.into_iter()
            .filter_map(|item| serde_json::from_value::<Page>(item).ok())
            .filter(|p| !p.id.trim().is_empty())
            .collect()
    }

    pub(crate) fn parse_max_position_response(data: &serde_json::Value) -> f64 {
        data.get("max_position")
            .or_else(|| data.get("position"))
            .and_then(|v| v.as_f64())
            .or_else(|| data.as_f64())
            .unwrap_or(0.0)
    }

    pub async fn list_blocks(&self, page_id: &str) -> ApiResult<Vec<Block>> {
        let data: serde_json::Value = self
            .request_api(
                "/blocks/list",
                &PageRequest {
                    page_id: page_id.to_string(),
                },
            )
            .await?;
        Ok(Self::parse_block_list_response(data))
    }

    pub async fn create_block(&self, draft: &BlockDraft) -> ApiResult<Block> {
        let data: serde_json::Value = self.request_api("/blocks/create", draft).await?;
        Self::parse_block_response(data)
    }

    pub async fn update_block(&self, block_id: &str, patch: BlockPatch) -> ApiResult<()> {
        self.send_api(
            "/blocks/update",
            &UpdateBlockRequest {
                id: block_id.to_string(),
                patch,
            },
        )
        .await
    }

    pub async fn delete_block(&self, block_id: &str) -> ApiResult<()> {
        self.send_api(
            "/blocks/delete",
            &BlockIdRequest {
                id: block_id.to_string(),
            },
        )
        .await
    }

    pub async fn duplicate_block(&self, block_id: &str) -> ApiResult<Block> {
        let data: serde_json::Value = self
            .request_api(
                "/blocks/duplicate",
                &BlockIdRequest {
                    id: block_id.to_string(),
                },
            )
            .await?;
        Self::parse_block_response(data)
    }

    pub async fn reorder_blocks(&self, page_id: &str, ordered_ids: Vec<String>) -> ApiResult<()> {
        self.send_api(
            "/blocks/reorder",
            &ReorderRequest {
                page_id: page_id.to_string(),
                ordered_ids,
            },
        )
        .await
    }

    pub async fn max_position(&self, page_id: &str) -> ApiResult<f64> {
        let data: serde_json::Value = self
            .request_api(
                "/blocks/max-position",
                &PageRequest {
                    page_id: page_id.to_string(),
                },
            )
            .await?;
        Ok(Self::parse_max_position_response(&data))
    }

    pub async fn move_block(&self, block_id: &str, target_page_id: &str, position: f64) -> ApiResult<()> {
        self.send_api(
            "/blocks/move",
            &MoveBlockRequest {
                id: block_id.to_string(),
                page_id: target_page_id.to_string(),
                position,
            },
        )
        .await
    }

    pub async fn create_link(&self, block_id: &str) -> ApiResult<BlockLink> {
        let mut link: BlockLink = self
            .request_api(
                "/blocks/link",
                &BlockIdRequest {
                    id: block_id.to_string(),
                },
            )
            .await?;
        if link.block_id.is_empty() {
            link.block_id = block_id.to_string();
        }
        Ok(link)
    }

    pub async fn resolve_link(&self, slug: &str) -> ApiResult<String> {
        let link: BlockLink = self
            .request_api(
                "/blocks/resolve-link",
                &ResolveLinkRequest {
                    slug: slug.to_string(),
                },
            )
            .await?;
        if link.block_id.trim().is_empty() {
            return Err(ApiError::parse(format!("slug {slug} resolved to no block")));
        }
        Ok(link.block_id)
    }

    pub async fn list_pages(&self) -> ApiResult<Vec<Page>> {
        let data: serde_json::Value = self
            .request_api("/pages/list", &serde_json::json!({}))
            .await?;
        Ok(Self::parse_page_list_response(data))
    }
}
