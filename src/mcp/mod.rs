use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::classify;
use crate::models::request::RulesRequest;
use crate::service::AppService;

// ---------------------------------------------------------------------------
// Tool parameter structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DatasetAddParams {
    /// Item labels of the new transaction (blank labels are dropped)
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DatasetUpdateParams {
    /// Zero-based position of the transaction to replace
    pub index: usize,
    /// Replacement item labels
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DatasetDeleteParams {
    /// Zero-based position of the transaction to remove
    pub index: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RulesGenerateParams {
    /// Minimum support in (0, 1] (default: configured, usually 0.3)
    #[serde(default)]
    pub min_support: Option<f64>,
    /// Minimum confidence in (0, 1] (default: configured, usually 0.6)
    #[serde(default)]
    pub min_confidence: Option<f64>,
}

// ---------------------------------------------------------------------------
// MCP Server
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CooccurServer {
    tool_router: ToolRouter<Self>,
    service: Arc<AppService>,
}

#[tool_router]
impl CooccurServer {
    pub fn new(service: Arc<AppService>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
        }
    }

    #[tool(
        name = "dataset_list",
        description = "List every stored transaction as an array of item-label arrays"
    )]
    async fn dataset_list(&self) -> Result<CallToolResult, McpError> {
        Self::to_tool_result(Ok(self.service.list()))
    }

    #[tool(
        name = "dataset_add",
        description = "Append a transaction (a set of co-occurring item labels) to the dataset"
    )]
    async fn dataset_add(
        &self,
        params: Parameters<DatasetAddParams>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_tool_result(self.service.add(&params.0.items))
    }

    #[tool(
        name = "dataset_update",
        description = "Replace the transaction at a zero-based index"
    )]
    async fn dataset_update(
        &self,
        params: Parameters<DatasetUpdateParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        Self::to_tool_result(self.service.update(p.index, &p.items))
    }

    #[tool(
        name = "dataset_delete",
        description = "Remove the transaction at a zero-based index; later indices shift down by one"
    )]
    async fn dataset_delete(
        &self,
        params: Parameters<DatasetDeleteParams>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_tool_result(self.service.delete(params.0.index))
    }

    #[tool(name = "dataset_clear", description = "Remove every transaction")]
    async fn dataset_clear(&self) -> Result<CallToolResult, McpError> {
        Self::to_tool_result(self.service.clear().map(|()| "cleared"))
    }

    #[tool(
        name = "rules_generate",
        description = "Mine association rules (antecedents -> consequents with support, confidence and lift) from the dataset using Apriori"
    )]
    async fn rules_generate(
        &self,
        params: Parameters<RulesGenerateParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let request = RulesRequest {
            min_support: p.min_support,
            min_confidence: p.min_confidence,
        };
        let mining = request.resolve(self.service.defaults());
        let service = Arc::clone(&self.service);
        let rules = tokio::task::spawn_blocking(move || service.generate_rules(&mining))
            .await
            .map_err(|e| McpError::internal_error(format!("Mining task failed: {e}"), None))?;
        Self::to_tool_result(rules)
    }
}

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

impl CooccurServer {
    fn to_tool_result<T: serde::Serialize>(
        result: anyhow::Result<T>,
    ) -> Result<CallToolResult, McpError> {
        match result {
            Ok(value) => {
                let json = serde_json::to_string(&value)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => {
                let (code, message) = classify(&e);
                let data = Some(serde_json::json!({ "code": code.to_string() }));
                if code.is_client_error() {
                    Err(McpError::invalid_params(message, data))
                } else {
                    Err(McpError::internal_error(message, data))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ServerHandler implementation
// ---------------------------------------------------------------------------

#[tool_handler]
impl ServerHandler for CooccurServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::new("cooccur", env!("CARGO_PKG_VERSION")))
            .with_instructions(
                "Record transactions of co-occurring labels and mine association rules from them.",
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(dir: &tempfile::TempDir) -> CooccurServer {
        CooccurServer::new(Arc::new(AppService::open(dir.path().join("dataset.json"))))
    }

    #[test]
    fn server_info_advertises_tools() {
        let dir = tempfile::TempDir::new().unwrap();
        let info = server(&dir).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "cooccur");
        assert!(info.instructions.is_some());
    }

    #[test]
    fn tool_result_wraps_json() {
        assert!(CooccurServer::to_tool_result(Ok(vec!["a", "b"])).is_ok());
    }

    #[test]
    fn tool_result_maps_errors() {
        let err: anyhow::Error = crate::error::RuleError::validation("bad").into();
        let result = CooccurServer::to_tool_result::<()>(Err(err));
        let err = result.unwrap_err();
        assert_eq!(err.message, "bad");
        assert_eq!(err.data, Some(serde_json::json!({ "code": "VALIDATION_ERROR" })));
    }

    #[tokio::test]
    async fn add_then_generate() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = server(&dir);
        for items in [vec!["a", "b"], vec!["a", "b"], vec!["c"]] {
            let params = DatasetAddParams {
                items: items.into_iter().map(String::from).collect(),
            };
            server.dataset_add(Parameters(params)).await.unwrap();
        }
        let params = RulesGenerateParams {
            min_support: Some(0.5),
            min_confidence: None,
        };
        server.rules_generate(Parameters(params)).await.unwrap();
        assert_eq!(server.service.list().len(), 3);
    }

    #[tokio::test]
    async fn generate_on_empty_dataset_reports_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = server(&dir);
        let params = RulesGenerateParams {
            min_support: None,
            min_confidence: None,
        };
        let err = server.rules_generate(Parameters(params)).await.unwrap_err();
        assert_eq!(err.data, Some(serde_json::json!({ "code": "EMPTY_DATASET" })));
    }

    #[tokio::test]
    async fn delete_invalid_index_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = server(&dir);
        let params = DatasetDeleteParams { index: 5 };
        assert!(server.dataset_delete(Parameters(params)).await.is_err());
    }
}
