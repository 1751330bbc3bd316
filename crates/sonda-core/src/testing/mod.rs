//! Test doubles for exercising the flow runner without a live backend.
//!
//! [`ScriptedApi`] answers every call with a canned success unless a
//! failure or transport error was scripted for that operation; scripted
//! entries are consumed in order. [`RecordingSink`] captures emitted
//! records for assertions.

use crate::client::{ApiSurface, CallOutcome, TransportError};
use crate::report::{FlowRecord, ReportSink};
use async_trait::async_trait;
use sonda_proto::{
    CadastroRequest, CadastroResponse, MensagemResponse, PedidosResponse, pedidos_fixos,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Sink that keeps every record; clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<FlowRecord>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<FlowRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Just the titles, in emission order.
    pub fn titles(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.title).collect()
    }
}

impl ReportSink for RecordingSink {
    fn emit(&mut self, record: &FlowRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

enum Scripted<T> {
    Outcome(CallOutcome<T>),
    Transport,
}

/// Scripted [`ApiSurface`] with per-operation call tracking.
#[derive(Default)]
pub struct ScriptedApi {
    default_usuario_id: u32,
    cadastro: Mutex<VecDeque<Scripted<CadastroResponse>>>,
    login: Mutex<VecDeque<Scripted<MensagemResponse>>>,
    alteracao: Mutex<VecDeque<Scripted<MensagemResponse>>>,
    pedidos: Mutex<VecDeque<Scripted<PedidosResponse>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            default_usuario_id: 54_321,
            ..Self::default()
        }
    }

    /// Sets the identifier returned by unscripted cadastro calls.
    pub fn with_usuario_id(mut self, usuario_id: u32) -> Self {
        self.default_usuario_id = usuario_id;
        self
    }

    pub fn fail_cadastro(self, status: u16, erro: &str) -> Self {
        self.cadastro
            .lock()
            .unwrap()
            .push_back(Scripted::Outcome(CallOutcome::Failure {
                status,
                erro: erro.to_string(),
            }));
        self
    }

    pub fn fail_login(self, status: u16, erro: &str) -> Self {
        self.login
            .lock()
            .unwrap()
            .push_back(Scripted::Outcome(CallOutcome::Failure {
                status,
                erro: erro.to_string(),
            }));
        self
    }

    pub fn fail_alteracao(self, status: u16, erro: &str) -> Self {
        self.alteracao
            .lock()
            .unwrap()
            .push_back(Scripted::Outcome(CallOutcome::Failure {
                status,
                erro: erro.to_string(),
            }));
        self
    }

    pub fn fail_pedidos(self, status: u16, erro: &str) -> Self {
        self.pedidos
            .lock()
            .unwrap()
            .push_back(Scripted::Outcome(CallOutcome::Failure {
                status,
                erro: erro.to_string(),
            }));
        self
    }

    pub fn transport_cadastro(self) -> Self {
        self.cadastro.lock().unwrap().push_back(Scripted::Transport);
        self
    }

    pub fn transport_login(self) -> Self {
        self.login.lock().unwrap().push_back(Scripted::Transport);
        self
    }

    pub fn transport_alteracao(self) -> Self {
        self.alteracao.lock().unwrap().push_back(Scripted::Transport);
        self
    }

    pub fn transport_pedidos(self) -> Self {
        self.pedidos.lock().unwrap().push_back(Scripted::Transport);
        self
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times `operation` was called.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    fn record_call(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }

    fn transport_error() -> TransportError {
        TransportError::Contract(serde_json::from_str::<serde_json::Value>("").unwrap_err())
    }
}

#[async_trait]
impl ApiSurface for ScriptedApi {
    async fn cadastrar(
        &self,
        _req: &CadastroRequest,
    ) -> Result<CallOutcome<CadastroResponse>, TransportError> {
        self.record_call("cadastro");
        match self.cadastro.lock().unwrap().pop_front() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Transport) => Err(Self::transport_error()),
            None => Ok(CallOutcome::Success {
                status: 200,
                data: CadastroResponse {
                    usuario_id: self.default_usuario_id,
                },
            }),
        }
    }

    async fn login(
        &self,
        _usuario_id: u32,
    ) -> Result<CallOutcome<MensagemResponse>, TransportError> {
        self.record_call("login");
        match self.login.lock().unwrap().pop_front() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Transport) => Err(Self::transport_error()),
            None => Ok(CallOutcome::Success {
                status: 200,
                data: MensagemResponse {
                    mensagem: "Login realizado com sucesso".to_string(),
                },
            }),
        }
    }

    async fn alterar_dados(
        &self,
        _usuario_id: u32,
    ) -> Result<CallOutcome<MensagemResponse>, TransportError> {
        self.record_call("alteracao");
        match self.alteracao.lock().unwrap().pop_front() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Transport) => Err(Self::transport_error()),
            None => Ok(CallOutcome::Success {
                status: 200,
                data: MensagemResponse {
                    mensagem: "Dados alterados com sucesso".to_string(),
                },
            }),
        }
    }

    async fn listar_pedidos(
        &self,
        _usuario_id: u32,
    ) -> Result<CallOutcome<PedidosResponse>, TransportError> {
        self.record_call("pedidos");
        match self.pedidos.lock().unwrap().pop_front() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Transport) => Err(Self::transport_error()),
            None => Ok(CallOutcome::Success {
                status: 200,
                data: PedidosResponse {
                    pedidos: pedidos_fixos(),
                },
            }),
        }
    }
}
