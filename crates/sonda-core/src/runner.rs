//! The sequential flow orchestrator.
//!
//! Steps run strictly in order; each one suspends at the network call and
//! the first failure of any kind aborts the rest of the flow. State moves
//! `Idle → Running → {Completed, Failed}` exactly once per invocation and
//! is fully reset when the next run starts.

use crate::client::{ApiSurface, CallOutcome, TransportError};
use crate::flow::{Flow, FlowState, FlowStatus, Step};
use crate::report::{Reporter, ReportSink};
use serde_json::{Map, Value, json};
use sonda_proto::{CadastroRequest, MensagemResponse};
use tracing::debug;

/// The canned registration payload every flow submits.
pub fn registration_payload() -> CadastroRequest {
    CadastroRequest {
        nome: Some("Usuário Teste".to_string()),
        email: Some("usuario@teste.com".to_string()),
        senha: Some("senha123".to_string()),
        origem: Some("teste-api".to_string()),
    }
}

/// Runs flows against an [`ApiSurface`], reporting every step outcome.
pub struct FlowRunner<A, S> {
    api: A,
    reporter: Reporter<S>,
    state: FlowState,
}

impl<A: ApiSurface, S: ReportSink> FlowRunner<A, S> {
    pub fn new(api: A, reporter: Reporter<S>) -> Self {
        Self {
            api,
            reporter,
            state: FlowState::new(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn reporter(&self) -> &Reporter<S> {
        &self.reporter
    }

    /// Executes one flow to completion or first failure.
    pub async fn run(&mut self, flow: Flow) -> FlowStatus {
        self.state.reset();
        self.state.status = FlowStatus::Running;
        debug!(flow = flow.label(), "fluxo iniciado");

        for step in flow.steps() {
            if !self.execute_step(*step).await {
                self.reporter.report(
                    &format!("Fluxo de {} Abortado", flow.label()),
                    Value::String(format!(
                        "O teste foi interrompido devido a falha na etapa de {}.",
                        step.stage_name()
                    )),
                    false,
                );
                self.state.status = FlowStatus::Failed;
                debug!(flow = flow.label(), etapa = step.stage_name(), "fluxo abortado");
                return FlowStatus::Failed;
            }
        }

        if flow == Flow::Listagem {
            self.reporter.report(
                "Fluxo de Teste Completo",
                Value::String("Todas as etapas foram executadas com sucesso.".to_string()),
                true,
            );
        }

        self.state.status = FlowStatus::Completed;
        debug!(flow = flow.label(), "fluxo concluído");
        FlowStatus::Completed
    }

    /// Runs one step and reports its outcome. Returns false on any
    /// failure, which aborts the flow.
    async fn execute_step(&mut self, step: Step) -> bool {
        self.reporter.report(
            step.start_title(),
            Value::String("Enviando requisição...".to_string()),
            true,
        );

        match step {
            Step::Cadastro => self.run_cadastro().await,
            Step::Login => match self.current_usuario_id(step) {
                Some(id) => {
                    let result = self.api.login(id).await;
                    self.finish_message_step(step, id, result)
                }
                None => false,
            },
            Step::Alteracao => match self.current_usuario_id(step) {
                Some(id) => {
                    let result = self.api.alterar_dados(id).await;
                    self.finish_message_step(step, id, result)
                }
                None => false,
            },
            Step::Listagem => match self.current_usuario_id(step) {
                Some(id) => {
                    let result = self.api.listar_pedidos(id).await;
                    self.finish_listagem_step(step, id, result)
                }
                None => false,
            },
        }
    }

    async fn run_cadastro(&mut self) -> bool {
        let step = Step::Cadastro;
        let req = registration_payload();

        let outcome = match self.api.cadastrar(&req).await {
            Ok(outcome) => outcome,
            Err(err) => return self.transport_failure(step, &err),
        };

        match outcome {
            CallOutcome::Success { status, data } => {
                self.state.usuario_id = Some(data.usuario_id);
                let body = envelope(
                    status,
                    json!({ "usuarioId": data.usuario_id }),
                    "request",
                    json!(req),
                );
                self.reporter.report(step.success_title(), body, true);
                true
            }
            CallOutcome::Failure { status, erro } => {
                let body = envelope(status, json!({ "erro": erro }), "request", json!(req));
                self.reporter.report(step.error_title(), body, false);
                false
            }
        }
    }

    fn finish_message_step(
        &mut self,
        step: Step,
        usuario_id: u32,
        result: Result<CallOutcome<MensagemResponse>, TransportError>,
    ) -> bool {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return self.transport_failure(step, &err),
        };

        match outcome {
            CallOutcome::Success { status, data } => {
                let body = envelope(
                    status,
                    json!({ "mensagem": data.mensagem }),
                    "usuarioId",
                    json!(usuario_id),
                );
                self.reporter.report(step.success_title(), body, true);
                true
            }
            CallOutcome::Failure { status, erro } => {
                let body = envelope(
                    status,
                    json!({ "erro": erro }),
                    "usuarioId",
                    json!(usuario_id),
                );
                self.reporter.report(step.error_title(), body, false);
                false
            }
        }
    }

    fn finish_listagem_step(
        &mut self,
        step: Step,
        usuario_id: u32,
        result: Result<CallOutcome<sonda_proto::PedidosResponse>, TransportError>,
    ) -> bool {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return self.transport_failure(step, &err),
        };

        match outcome {
            CallOutcome::Success { status, data } => {
                let body = envelope(
                    status,
                    json!({ "pedidos": data.pedidos }),
                    "usuarioId",
                    json!(usuario_id),
                );
                self.reporter.report(step.success_title(), body, true);
                true
            }
            CallOutcome::Failure { status, erro } => {
                let body = envelope(
                    status,
                    json!({ "erro": erro }),
                    "usuarioId",
                    json!(usuario_id),
                );
                self.reporter.report(step.error_title(), body, false);
                false
            }
        }
    }

    fn transport_failure(&mut self, step: Step, err: &TransportError) -> bool {
        debug!(etapa = step.stage_name(), erro = %err, "falha de transporte");
        self.reporter.report_transport(step.transport_title(), err);
        false
    }

    /// Every flow registers first, so the identifier must be present by
    /// the time a dependent step runs. The guard still reports instead of
    /// panicking if that invariant is ever broken.
    fn current_usuario_id(&mut self, step: Step) -> Option<u32> {
        let id = self.state.usuario_id;
        if id.is_none() {
            self.reporter.report(
                step.error_title(),
                json!({ "data": { "erro": "usuarioId ausente" } }),
                false,
            );
        }
        id
    }
}

/// Monitor-mode body for one HTTP outcome: status, the response data, and
/// the request context (the registration payload or the identifier echo).
fn envelope(status: u16, data: Value, context_key: &str, context: Value) -> Value {
    let mut body = Map::new();
    body.insert("status".to_string(), json!(status));
    body.insert("data".to_string(), data);
    body.insert(context_key.to_string(), context);
    Value::Object(body)
}
