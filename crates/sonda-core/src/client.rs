//! HTTP client for the simulated API.
//!
//! [`ApiSurface`] is the seam between the orchestrator and the wire: the
//! runner only sees typed outcomes, so tests script it without a server
//! and the CLI plugs in [`HttpApi`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sonda_proto::{CadastroRequest, CadastroResponse, MensagemResponse, PedidosResponse};
use thiserror::Error;

/// The call reached the server but could not produce a usable outcome,
/// or never reached it at all. Never retried; aborts the flow.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("falha na comunicação com o servidor: {0}")]
    Request(#[from] reqwest::Error),
    #[error("corpo de resposta malformado: {0}")]
    MalformedBody(#[source] reqwest::Error),
    #[error("resposta fora do contrato: {0}")]
    Contract(#[from] serde_json::Error),
}

/// Outcome of one simulated API call that produced an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success { status: u16, data: T },
    Failure { status: u16, erro: String },
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }
}

/// The four operations of the user lifecycle, as seen by the runner.
#[async_trait]
pub trait ApiSurface: Send + Sync {
    async fn cadastrar(
        &self,
        req: &CadastroRequest,
    ) -> Result<CallOutcome<CadastroResponse>, TransportError>;

    async fn login(&self, usuario_id: u32)
    -> Result<CallOutcome<MensagemResponse>, TransportError>;

    async fn alterar_dados(
        &self,
        usuario_id: u32,
    ) -> Result<CallOutcome<MensagemResponse>, TransportError>;

    async fn listar_pedidos(
        &self,
        usuario_id: u32,
    ) -> Result<CallOutcome<PedidosResponse>, TransportError>;
}

/// Real client over reqwest.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<CallOutcome<T>, TransportError> {
        let status = resp.status().as_u16();
        let body: Value = resp.json().await.map_err(TransportError::MalformedBody)?;

        if (200..300).contains(&status) {
            let data = serde_json::from_value(body)?;
            Ok(CallOutcome::Success { status, data })
        } else {
            let erro = body
                .get("erro")
                .and_then(Value::as_str)
                .unwrap_or("Erro desconhecido")
                .to_string();
            Ok(CallOutcome::Failure { status, erro })
        }
    }
}

#[async_trait]
impl ApiSurface for HttpApi {
    async fn cadastrar(
        &self,
        req: &CadastroRequest,
    ) -> Result<CallOutcome<CadastroResponse>, TransportError> {
        let resp = self
            .http
            .post(format!("{}/cadastro", self.base_url))
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn login(
        &self,
        usuario_id: u32,
    ) -> Result<CallOutcome<MensagemResponse>, TransportError> {
        let resp = self
            .http
            .get(format!("{}/login", self.base_url))
            .query(&[("usuarioId", usuario_id)])
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn alterar_dados(
        &self,
        usuario_id: u32,
    ) -> Result<CallOutcome<MensagemResponse>, TransportError> {
        let resp = self
            .http
            .put(format!("{}/alteracao", self.base_url))
            .query(&[("usuarioId", usuario_id)])
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn listar_pedidos(
        &self,
        usuario_id: u32,
    ) -> Result<CallOutcome<PedidosResponse>, TransportError> {
        let resp = self
            .http
            .get(format!("{}/pedidos", self.base_url))
            .query(&[("usuarioId", usuario_id)])
            .send()
            .await?;
        Self::decode(resp).await
    }
}
