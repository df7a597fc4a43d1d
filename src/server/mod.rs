//! MCP stdio server exposing `analyze_repo` and `code_review`
//!
//! stdout carries protocol frames only; all logging goes to stderr. Tool
//! failures are reported as `isError` results and never end the session.

use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::transport::stdio;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;

use crate::config::{LlmConfig, Settings};
use crate::domain::{DetailLevel, FocusArea, ReviewOptions};
use crate::error::{self, ReviewError};
use crate::flatten::{FlattenRequest, Flattener};
use crate::review::CodeReviewService;

pub const SERVER_NAME: &str = "code-review-server";

const ENV_HINT: &str = "Make sure you have set the necessary environment variables \
(LLM_PROVIDER and the corresponding API key).";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRepoRequest {
    #[schemars(description = "Path to the repository to analyze")]
    pub repo_path: String,

    #[schemars(description = "Specific files to analyze")]
    pub specific_files: Option<Vec<String>>,

    #[schemars(description = "File types to include in the analysis")]
    pub file_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeReviewRequest {
    #[schemars(description = "Path to the repository to analyze")]
    pub repo_path: String,

    #[schemars(description = "Specific files to review")]
    pub specific_files: Option<Vec<String>>,

    #[schemars(description = "File types to include in the review")]
    pub file_types: Option<Vec<String>>,

    #[schemars(description = "Level of detail for the code review")]
    pub detail_level: Option<DetailLevel>,

    #[schemars(description = "Areas to focus on during the code review")]
    pub focus_areas: Option<Vec<FocusArea>>,
}

/// MCP service. Cheap to clone; every field is shared and immutable.
#[derive(Clone)]
pub struct CodeReviewServer {
    flattener: Flattener,
    /// Built once at startup. A configuration error is kept as its message
    /// and reported on every `code_review` call.
    reviewer: Result<Arc<CodeReviewService>, String>,
    tool_router: ToolRouter<Self>,
}

impl CodeReviewServer {
    pub fn new(settings: Arc<Settings>, llm: error::Result<LlmConfig>) -> Self {
        let flattener = Flattener::new(&settings.flattener);
        let reviewer = llm
            .and_then(|config| CodeReviewService::new(settings, &config))
            .map(Arc::new)
            .map_err(|e| {
                tracing::warn!("Code review is unavailable: {e}");
                match e {
                    ReviewError::Config(msg) => msg,
                    other => other.to_string(),
                }
            });

        Self { flattener, reviewer, tool_router: Self::tool_router() }
    }
}

#[tool_handler]
impl ServerHandler for CodeReviewServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            instructions: Some(
                "A custom MCP server to perform code reviews. Use 'analyze_repo' to get a \
                 flattened view of a repository and 'code_review' for a structured review \
                 from the configured LLM."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            ..Default::default()
        }
    }
}

#[tool_router]
impl CodeReviewServer {
    #[tool(
        description = "Use this tool when you need to analyze a code repository structure without performing a detailed review. This tool flattens the repository into a textual representation and is ideal for getting a high-level overview of code organization, directory structure, and file contents. Use it before code_review when you need to understand the codebase structure first, or when a full code review is not needed."
    )]
    pub async fn analyze_repo(
        &self,
        Parameters(request): Parameters<AnalyzeRepoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let repo = PathBuf::from(&request.repo_path);
        let flatten = FlattenRequest::new(request.specific_files, request.file_types);

        match self.flattener.flatten(&repo, &flatten).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                tracing::error!("analyze_repo failed for {}: {e}", request.repo_path);
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "Error analyzing repository: {e}"
                ))]))
            }
        }
    }

    #[tool(
        description = "Use this tool when you need a comprehensive code review with specific feedback on code quality, security issues, performance problems, and maintainability concerns. This tool performs in-depth analysis on a repository or specific files and returns structured results including issues found, their severity, recommendations for fixes, and overall strengths of the codebase. Use it when you need actionable insights to improve code quality or when evaluating a codebase for potential problems."
    )]
    pub async fn code_review(
        &self,
        Parameters(request): Parameters<CodeReviewRequest>,
    ) -> Result<CallToolResult, McpError> {
        let reviewer = match &self.reviewer {
            Ok(reviewer) => reviewer,
            Err(msg) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Error initializing code review service: {}. {ENV_HINT}",
                    msg.trim_end_matches('.')
                ))]));
            }
        };

        let repo = PathBuf::from(&request.repo_path);
        let flatten = FlattenRequest::new(request.specific_files, request.file_types);
        let options = ReviewOptions::from_parts(request.detail_level, request.focus_areas);

        let review = match reviewer.review_repo(&repo, &flatten, &options).await {
            Ok(review) => review,
            Err(e) => {
                tracing::error!("code_review failed for {}: {e}", request.repo_path);
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Error performing code review: {e}"
                ))]));
            }
        };

        match serde_json::to_string_pretty(&review) {
            Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error serializing review: {e}"
            ))])),
        }
    }
}

/// Run the MCP server over stdio until the client disconnects.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    install_panic_hook();

    let server = CodeReviewServer::new(Arc::new(settings), LlmConfig::from_env());
    tracing::info!("Starting {SERVER_NAME} MCP server");

    let running = server.serve(stdio()).await?;
    running.waiting().await?;

    tracing::info!("{SERVER_NAME} MCP server stopped");
    Ok(())
}

/// Route panics through `tracing` so they land in the stderr log instead of
/// being lost. The previous hook still runs afterwards.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line()));
        tracing::error!(location = location.as_deref().unwrap_or("unknown"), "panic: {message}");
        previous(info);
    }));
}
