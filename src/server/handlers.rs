use crate::domain::entities::collection::CollectionInfo;
use crate::domain::entities::retrieval::RetrievalResult;
use crate::server::types::{ApiError, RetrieveRequest};
use crate::NewsRag;
use axum::extract::{Json, State};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// POST /retrieve - nearest documents for a free-text query
pub async fn retrieve(
    State(app): State<Arc<NewsRag>>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrievalResult>, ApiError> {
    let span = tracing::info_span!("retrieve", request_id = %Uuid::new_v4(), top_k = request.top_k);
    async move {
        let result = app.retrieve(&request.query, request.top_k).await?;
        tracing::info!(returned = result.len(), "retrieval complete");
        Ok(Json(result))
    }
    .instrument(span)
    .await
}

/// GET /collection - name, size and dimension of the served collection
pub async fn collection(State(app): State<Arc<NewsRag>>) -> Result<Json<CollectionInfo>, ApiError> {
    Ok(Json(app.stats()?))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
