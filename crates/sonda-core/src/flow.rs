//! Flow and step definitions.
//!
//! The four flows are strict prefixes of the maximal step sequence
//! [Cadastro, Login, Alteração, Listagem]. Every flow starts by
//! registering a fresh user, so no identifier survives from one run to
//! the next.

/// A named test flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Cadastro,
    Login,
    Edicao,
    Listagem,
}

impl Flow {
    /// All flows, in menu order.
    pub const ALL: [Flow; 4] = [Flow::Cadastro, Flow::Login, Flow::Edicao, Flow::Listagem];

    /// The step sequence this flow executes, in order.
    pub fn steps(self) -> &'static [Step] {
        match self {
            Flow::Cadastro => &[Step::Cadastro],
            Flow::Login => &[Step::Cadastro, Step::Login],
            Flow::Edicao => &[Step::Cadastro, Step::Login, Step::Alteracao],
            Flow::Listagem => &[
                Step::Cadastro,
                Step::Login,
                Step::Alteracao,
                Step::Listagem,
            ],
        }
    }

    /// Display label used in report titles.
    pub fn label(self) -> &'static str {
        match self {
            Flow::Cadastro => "Cadastro",
            Flow::Login => "Login",
            Flow::Edicao => "Edição",
            Flow::Listagem => "Listagem",
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One step of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Cadastro,
    Login,
    Alteracao,
    Listagem,
}

impl Step {
    /// Stage name used in the abort message.
    pub fn stage_name(self) -> &'static str {
        match self {
            Step::Cadastro => "cadastro",
            Step::Login => "login",
            Step::Alteracao => "alteração de dados",
            Step::Listagem => "listagem de pedidos",
        }
    }

    /// Title of the progress record emitted before the call.
    pub fn start_title(self) -> &'static str {
        match self {
            Step::Cadastro => "Iniciando Cadastro de Usuário",
            Step::Login => "Iniciando Login",
            Step::Alteracao => "Iniciando Alteração de Dados",
            Step::Listagem => "Iniciando Listagem de Pedidos",
        }
    }

    /// Title of the success record.
    pub fn success_title(self) -> &'static str {
        match self {
            Step::Cadastro => "Cadastro Realizado com Sucesso",
            Step::Login => "Login Realizado com Sucesso",
            Step::Alteracao => "Dados Alterados com Sucesso",
            Step::Listagem => "Pedidos Listados com Sucesso",
        }
    }

    /// Title of the record for an application-level failure.
    pub fn error_title(self) -> &'static str {
        match self {
            Step::Cadastro => "Erro no Cadastro",
            Step::Login => "Erro no Login",
            Step::Alteracao => "Erro na Alteração de Dados",
            Step::Listagem => "Erro na Listagem de Pedidos",
        }
    }

    /// Title of the record for a transport-level failure.
    pub fn transport_title(self) -> &'static str {
        match self {
            Step::Cadastro => "Erro na Requisição de Cadastro",
            Step::Login => "Erro na Requisição de Login",
            Step::Alteracao => "Erro na Requisição de Alteração",
            Step::Listagem => "Erro na Requisição de Listagem",
        }
    }
}

/// Overall status of a flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl FlowStatus {
    /// Status badge label.
    pub fn label(self) -> &'static str {
        match self {
            FlowStatus::Idle => "Aguardando",
            FlowStatus::Running => "Executando",
            FlowStatus::Completed => "Concluído",
            FlowStatus::Failed => "Falha",
        }
    }
}

/// Per-run mutable state owned by the flow runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowState {
    /// Identifier produced by the registration step, if reached.
    pub usuario_id: Option<u32>,
    /// Where the run currently stands.
    pub status: FlowStatus,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the identifier and returns the status to `Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
