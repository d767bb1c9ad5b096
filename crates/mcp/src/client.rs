//! HTTP transport for the tool service

use crate::types::{RpcRequest, RpcResponse, ToolCallParams, ToolList};
use crate::{McpError, Result, ToolClient, ToolDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_ID: u64 = 1;

/// JSON-RPC client posting to `<base>/list_tools` and `<base>/call_tool`
pub struct McpHttpClient {
    base_url: String,
    http: Mutex<Option<Client>>,
    tools: Mutex<Vec<ToolDescriptor>>,
}

impl McpHttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, verify_tls: bool) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(McpError::Transport)?;

        if !verify_tls {
            warn!("◆ TLS VERIFICATION DISABLED FOR TOOL SERVICE");
        }

        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Mutex::new(Some(http)),
            tools: Mutex::new(Vec::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn http(&self) -> Result<Client> {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(McpError::Closed)
    }

    async fn post<P: Serialize>(
        &self,
        endpoint: &str,
        method: &str,
        params: Option<P>,
    ) -> Result<RpcResponse> {
        let http = self.http()?;
        let url = format!("{}/{}", self.base_url, endpoint);
        let request = RpcRequest::new(REQUEST_ID, method, params);

        debug!("◆ POST {} ({})", url, method);
        let response = http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ToolClient for McpHttpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let response = self.post::<Value>("list_tools", "tools/list", None).await?;

        let listed = match response.result {
            Some(result) => serde_json::from_value::<ToolList>(result)?.tools,
            None => None,
        };

        let Some(tools) = listed else {
            warn!("◆ TOOL SERVICE RETURNED NO TOOL LIST");
            return Ok(Vec::new());
        };

        info!("◆ DISCOVERED {} TOOLS", tools.len());
        *self.tools.lock().unwrap_or_else(PoisonError::into_inner) = tools.clone();
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<Option<Value>> {
        debug!("◆ CALLING TOOL {}", name);

        let params = ToolCallParams {
            name,
            arguments: &arguments,
        };
        let response = self.post("call_tool", "tools/call", Some(params)).await?;

        if let Some(result) = response.result {
            return Ok(Some(result));
        }
        if let Some(error) = response.error {
            return Err(McpError::Remote(error));
        }
        Ok(None)
    }

    fn cached_tools(&self) -> Vec<ToolDescriptor> {
        self.tools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn close(&self) {
        let released = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            info!("◆ TOOL CLIENT CLOSED");
        }
    }
}
