//! The four mock endpoints.
//!
//! Every handler follows the same shape: validate required input, consult
//! the fault injector, return the canned success payload. Nothing is
//! persisted; each call stands alone.

use crate::fault::{FaultInjector, Operation};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;
use sonda_proto::{
    CadastroRequest, CadastroResponse, ErroBody, MensagemResponse, PedidosResponse, pedidos_fixos,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub faults: Arc<FaultInjector>,
}

impl AppState {
    pub fn new(faults: FaultInjector) -> Self {
        Self {
            faults: Arc::new(faults),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FaultInjector::new())
    }
}

/// Builds the API router. CORS is permissive so a browser page served from
/// anywhere can drive the harness.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/cadastro", post(cadastro))
        .route("/api/login", get(login))
        .route("/api/alteracao", put(alteracao))
        .route("/api/pedidos", get(pedidos))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query parameters carrying the identifier.
///
/// Kept as a raw string so a missing, empty, or non-numeric value all fall
/// into the same validation error.
#[derive(Debug, Deserialize)]
struct UsuarioIdQuery {
    #[serde(rename = "usuarioId")]
    usuario_id: Option<String>,
}

fn bad_request(mensagem: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErroBody::new(mensagem))).into_response()
}

/// Extracts a usable identifier or the 400 response. Zero is rejected like
/// the other malformed values.
fn parse_usuario_id(query: &UsuarioIdQuery) -> Result<u32, Response> {
    query
        .usuario_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|id| *id != 0)
        .ok_or_else(|| bad_request("usuarioId não fornecido"))
}

async fn cadastro(State(state): State<AppState>, Json(req): Json<CadastroRequest>) -> Response {
    if !req.required_fields_present() {
        return bad_request("Dados incompletos");
    }

    let usuario_id = state.faults.new_usuario_id();
    debug!(usuario_id, origem = req.origem.as_deref(), "cadastro ok");
    (StatusCode::OK, Json(CadastroResponse { usuario_id })).into_response()
}

async fn login(State(state): State<AppState>, Query(query): Query<UsuarioIdQuery>) -> Response {
    let usuario_id = match parse_usuario_id(&query) {
        Ok(id) => id,
        Err(resposta) => return resposta,
    };

    if let Some(fault) = state.faults.decide(Operation::Login, usuario_id) {
        return fault.into_response();
    }

    let body = MensagemResponse {
        mensagem: "Login realizado com sucesso".to_string(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn alteracao(State(state): State<AppState>, Query(query): Query<UsuarioIdQuery>) -> Response {
    let usuario_id = match parse_usuario_id(&query) {
        Ok(id) => id,
        Err(resposta) => return resposta,
    };

    if let Some(fault) = state.faults.decide(Operation::Alteracao, usuario_id) {
        return fault.into_response();
    }

    let body = MensagemResponse {
        mensagem: "Dados alterados com sucesso".to_string(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn pedidos(State(state): State<AppState>, Query(query): Query<UsuarioIdQuery>) -> Response {
    let usuario_id = match parse_usuario_id(&query) {
        Ok(id) => id,
        Err(resposta) => return resposta,
    };

    if let Some(fault) = state.faults.decide(Operation::Pedidos, usuario_id) {
        return fault.into_response();
    }

    let body = PedidosResponse {
        pedidos: pedidos_fixos(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: Option<&str>) -> UsuarioIdQuery {
        UsuarioIdQuery {
            usuario_id: raw.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_usuario_id_accepts_plain_integers() {
        assert_eq!(parse_usuario_id(&query(Some("12345"))).unwrap(), 12_345);
        assert_eq!(parse_usuario_id(&query(Some(" 16 "))).unwrap(), 16);
    }

    #[test]
    fn test_parse_usuario_id_rejects_missing_and_malformed() {
        for raw in [None, Some(""), Some("abc"), Some("15.5"), Some("0"), Some("-3")] {
            assert!(parse_usuario_id(&query(raw)).is_err(), "{raw:?}");
        }
    }
}
