//! HTTP API server.
//!
//! Two read-only endpoints over the retrieval and synthesis pipelines, plus
//! a health check. Collaborator handles are opened once at startup and
//! shared read-only across requests.

use super::{build_embedder, open_vector_store};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::SvarError;
use crate::llm::OpenAICompletion;
use crate::retrieval::Retriever;
use crate::synthesis::{AnswerEngine, AnswerResponse};
use crate::vector_store::ChunkMetadata;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    retriever: Retriever,
    engine: AnswerEngine,
    default_k: usize,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let vector_store = open_vector_store(&settings)?;
    let embedder = build_embedder(&settings);

    let llm = Arc::new(OpenAICompletion::new(
        &settings.synthesis.model,
        settings.synthesis.temperature,
        settings.synthesis.streaming,
    ));
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let retriever = Retriever::new(vector_store.clone(), embedder.clone());
    let engine = AnswerEngine::new(
        Retriever::new(vector_store, embedder),
        llm,
        prompts,
    )
    .with_max_context_chunks(settings.synthesis.max_context_chunks)
    .with_rewrite(settings.synthesis.rewrite_queries);

    let state = Arc::new(AppState {
        retriever,
        engine,
        default_k: settings.retrieval.default_k,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/ask", get(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET /health");
    Output::kv("Search", "GET /search?q=<query>&k=<limit>");
    Output::kv("Ask (RAG)", "GET /ask?q=<question>");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchParams {
    /// Search query string
    q: String,
    /// Maximum number of results
    k: Option<usize>,
}

#[derive(Deserialize)]
struct AskParams {
    /// Question to ask
    q: String,
}

#[derive(Serialize)]
struct SearchHit {
    text: String,
    metadata: ChunkMetadata,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_status(e: &SvarError) -> StatusCode {
    // Retrieval and synthesis failures stay distinguishable: a failed LLM
    // call after successful retrieval reports as a bad gateway, not a
    // generic server error.
    if e.is_retrieval_failure() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_GATEWAY
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let k = params.k.unwrap_or(state.default_k);

    match state.retriever.retrieve(&params.q, k).await {
        Ok(results) => Json(
            results
                .into_iter()
                .map(|scored| SearchHit {
                    text: scored.chunk.text.clone(),
                    metadata: scored.chunk.metadata(),
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Retrieval failed: {}", e),
            }),
        )
            .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AskParams>,
) -> impl IntoResponse {
    match state.engine.ask(&params.q).await {
        Ok(response) => Json::<AnswerResponse>(response).into_response(),
        Err(e) => {
            let message = if e.is_retrieval_failure() {
                format!("Retrieval failed: {}", e)
            } else {
                format!("Answer synthesis failed: {}", e)
            };
            (error_status(&e), Json(ErrorResponse { error: message })).into_response()
        }
    }
}
