use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};
use yonis_core::{coords, AiSettings, Session, Taxonomy, ViewMode};
use yonis_oracle::{Generator, LlmGenerator, Oracle};

const INSTRUCTIONS: &str = r#"The 84 Yonis map: 7 domains of 12 states each, from Tamas (inertia, states 1-12) to Liberated (states 73-84). Most humans oscillate between states 37 and 55; very few stably cross 61.

Browse with `list_domains`, `get_domain` and `get_state`. `get_plot` returns the scatter-plot layout: x is complexity of experience (state index within a domain), y is depth of awareness (domain, 1 at the bottom, 7 at the top), both as percentages.

`diagnose` sends free text to the configured model and maps it to one state. Only one diagnostic runs at a time. If the remote call fails for any reason the oracle answers with state 49 and an interference message; treat that as "try again", not as a diagnosis.

The session remembers the selected state, the last diagnosis and the current view (`grid` or `graph`). Inspect it with `get_session`."#;

// --- Requests ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetDomainRequest {
    /// Domain ID, 1 (Tamas) through 7 (Liberated)
    domain_id: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetStateRequest {
    /// State ID, 1 through 84
    state_id: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct DiagnoseRequest {
    /// Free text describing the subject's current mental state, recurring fears or deepest desire
    text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SelectStateRequest {
    /// State ID to select, 1 through 84
    state_id: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetViewRequest {
    /// "grid" or "graph"
    view: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SaveAiSettingsRequest {
    /// One of "openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek"
    provider: String,
    /// API key. Omit to keep the stored key.
    api_key: Option<String>,
    /// Model name, e.g. "gemini-2.5-flash"
    model: String,
    /// Upper bound on one classification call, in seconds
    timeout_secs: Option<u64>,
}

// --- Responses ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView<'a> {
    state: &'a yonis_core::State,
    domain_id: u32,
    domain_name: &'a str,
    position: Option<coords::Point>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnoseView<'a> {
    result: &'a yonis_core::DiagnosticResult,
    state: Option<StateView<'a>>,
}

// --- Server ---

type SharedOracle = Arc<Oracle<Box<dyn Generator>>>;

/// Builds the remote generator for a given set of settings.
type GeneratorFactory = Arc<dyn Fn(&AiSettings) -> Box<dyn Generator> + Send + Sync>;

#[derive(Clone)]
pub struct YonisServer {
    tool_router: ToolRouter<Self>,
    taxonomy: Arc<Taxonomy>,
    session: Arc<Mutex<Session>>,
    settings: Arc<Mutex<AiSettings>>,
    settings_path: PathBuf,
    generators: GeneratorFactory,
    oracle: Arc<Mutex<SharedOracle>>,
}

#[tool_router]
impl YonisServer {
    pub fn new(taxonomy: Arc<Taxonomy>, settings: AiSettings, settings_path: PathBuf) -> Self {
        let generators: GeneratorFactory = Arc::new(|settings: &AiSettings| {
            Box::new(LlmGenerator::new(settings.clone())) as Box<dyn Generator>
        });
        Self::with_generators(taxonomy, settings, settings_path, generators)
    }

    fn with_generators(
        taxonomy: Arc<Taxonomy>,
        settings: AiSettings,
        settings_path: PathBuf,
        generators: GeneratorFactory,
    ) -> Self {
        let oracle = build_oracle(&generators, &settings, &taxonomy);
        Self {
            tool_router: Self::tool_router(),
            session: Arc::new(Mutex::new(Session::new(taxonomy.clone()))),
            taxonomy,
            settings: Arc::new(Mutex::new(settings)),
            settings_path,
            generators,
            oracle: Arc::new(Mutex::new(oracle)),
        }
    }

    #[tool(
        description = "List all 7 domains with their 12 states. Selected state is marked with '>', the diagnosed state with '*'."
    )]
    fn list_domains(&self) -> Result<CallToolResult, McpError> {
        let session = self.session();
        let selected = session.selected_state().map(|s| s.id);
        let mut out = String::with_capacity(4096);
        for domain in self.taxonomy.domains() {
            out.push_str(&format!(
                "{}. {} - {}\n",
                domain.id, domain.name, domain.subtitle
            ));
            for state in &domain.states {
                let mark = match (selected == Some(state.id), session.is_diagnosed(state.id)) {
                    (_, true) => '*',
                    (true, false) => '>',
                    _ => ' ',
                };
                out.push_str(&format!("  {}{:>2} {}\n", mark, state.id, state.name));
            }
        }
        Ok(CallToolResult::success(vec![Content::text(out)]))
    }

    #[tool(description = "Get one domain with its description and all 12 states as JSON")]
    fn get_domain(
        &self,
        Parameters(req): Parameters<GetDomainRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.taxonomy.domain(req.domain_id) {
            Some(domain) => Ok(json_result(domain)),
            None => Ok(CallToolResult::error(vec![Content::text(format!(
                "No domain with id {}. Domains run 1-7.",
                req.domain_id
            ))])),
        }
    }

    #[tool(
        description = "Get one state with its owning domain and its plot position. Returns {state: {id, name, description}, domainId, domainName, position: {x, y}}."
    )]
    fn get_state(
        &self,
        Parameters(req): Parameters<GetStateRequest>,
    ) -> Result<CallToolResult, McpError> {
        match state_view(&self.taxonomy, req.state_id) {
            Some(view) => Ok(json_result(&view)),
            None => Ok(CallToolResult::error(vec![Content::text(format!(
                "No state with id {}. States run 1-84.",
                req.state_id
            ))])),
        }
    }

    #[tool(
        description = "Get the scatter-plot layout: nodes, per-domain connection segments, row and column grid lines, and the population density overlay. All coordinates are percentages, y = 0 at the top."
    )]
    fn get_plot(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&coords::layout(&self.taxonomy)))
    }

    #[tool(
        description = "Classify free text into one of the 84 states. Returns {result: {stateId, analysis, recommendation}, state?}. On success the state is selected and the view switches to graph."
    )]
    async fn diagnose(
        &self,
        Parameters(req): Parameters<DiagnoseRequest>,
    ) -> Result<CallToolResult, McpError> {
        let configured = yonis_core::ai_configured(&self.settings());
        if !configured {
            return Ok(CallToolResult::error(vec![Content::text(
                "AI is not configured. Call save_ai_settings or set YONIS_API_KEY.",
            )]));
        }

        let begun = self.session().begin_diagnostic(&req.text);
        if let Err(e) = begun {
            return Ok(CallToolResult::error(vec![Content::text(e.to_string())]));
        }

        let oracle = self.oracle().clone();
        let result = oracle.classify(&req.text).await;
        info!(state_id = result.state_id, "diagnostic complete");

        self.session().apply_diagnosis(result.clone());

        Ok(json_result(&DiagnoseView {
            result: &result,
            state: state_view(&self.taxonomy, result.state_id),
        }))
    }

    #[tool(description = "Select a state in the session")]
    fn select_state(
        &self,
        Parameters(req): Parameters<SelectStateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session();
        match session.select_state(req.state_id) {
            Ok(state) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Selected {} ({})",
                state.id, state.name
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    #[tool(description = "Switch the session view to \"grid\" or \"graph\"")]
    fn set_view(
        &self,
        Parameters(req): Parameters<SetViewRequest>,
    ) -> Result<CallToolResult, McpError> {
        let view = match req.view.as_str() {
            "grid" => ViewMode::Grid,
            "graph" => ViewMode::Graph,
            other => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Unknown view '{}'. Use \"grid\" or \"graph\".",
                    other
                ))]))
            }
        };
        self.session().set_view(view);
        Ok(CallToolResult::success(vec![Content::text(format!(
            "View set to {}",
            req.view
        ))]))
    }

    #[tool(
        description = "Get the session: {view, selectedState?, selectedDomain?, diagnosis?, processing}"
    )]
    fn get_session(&self) -> Result<CallToolResult, McpError> {
        let snapshot = self.session().snapshot();
        Ok(json_result(&snapshot))
    }

    #[tool(description = "Get the AI provider settings. The API key itself is never returned.")]
    fn get_ai_settings(&self) -> Result<CallToolResult, McpError> {
        let settings = self.settings().clone();
        Ok(json_result(&serde_json::json!({
            "provider": settings.provider,
            "model": settings.model,
            "timeoutSecs": settings.timeout_secs,
            "hasKey": !settings.api_key.is_empty(),
            "configured": yonis_core::ai_configured(&settings),
        })))
    }

    #[tool(description = "Save the AI provider settings used by diagnose")]
    fn save_ai_settings(
        &self,
        Parameters(req): Parameters<SaveAiSettingsRequest>,
    ) -> Result<CallToolResult, McpError> {
        if req.timeout_secs == Some(0) {
            return Ok(CallToolResult::error(vec![Content::text(
                "timeout_secs must be at least 1",
            )]));
        }
        let mut settings = self.settings();
        settings.provider = req.provider;
        settings.model = req.model;
        if let Some(key) = req.api_key {
            settings.api_key = key;
        }
        if let Some(secs) = req.timeout_secs {
            settings.timeout_secs = secs;
        }
        *self.oracle() = build_oracle(&self.generators, &settings, &self.taxonomy);
        match yonis_core::write_settings_to(&self.settings_path, &settings) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Saved settings for {} ({})",
                settings.provider, settings.model
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to save settings: {}",
                e
            ))])),
        }
    }
}

impl YonisServer {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn settings(&self) -> MutexGuard<'_, AiSettings> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn oracle(&self) -> MutexGuard<'_, SharedOracle> {
        self.oracle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[tool_handler]
impl ServerHandler for YonisServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn build_oracle(
    generators: &GeneratorFactory,
    settings: &AiSettings,
    taxonomy: &Taxonomy,
) -> SharedOracle {
    Arc::new(Oracle::configured(generators(settings), settings, taxonomy))
}

fn state_view(taxonomy: &Taxonomy, state_id: u32) -> Option<StateView<'_>> {
    let (domain, state) = taxonomy.resolve(state_id)?;
    Some(StateView {
        state,
        domain_id: domain.id,
        domain_name: &domain.name,
        position: coords::state_position(state_id),
    })
}

fn json_result<T: Serialize + ?Sized>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => CallToolResult::error(vec![Content::text(format!(
            "Serialization error: {}",
            e
        ))]),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let taxonomy = Arc::new(Taxonomy::standard());
    let settings = yonis_core::read_settings();
    info!(
        provider = %settings.provider,
        model = %settings.model,
        configured = yonis_core::ai_configured(&settings),
        "starting yonis-mcp"
    );

    let service = YonisServer::new(taxonomy, settings, yonis_core::settings_path())
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| error!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}
