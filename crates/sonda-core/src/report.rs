//! Result reporting and the mode-dependent redaction policy.
//!
//! Every record produced by a flow passes through [`Reporter::report`],
//! which applies [`redact`] before handing the record to the sink. The
//! policy lives here and nowhere else, so client mode cannot leak data
//! through a call site that forgot to filter.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Display mode, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Full diagnostic visibility: payloads pass through untouched.
    Monitor,
    /// Redacted view for end users.
    #[default]
    #[serde(rename = "cliente", alias = "client")]
    Client,
}

impl DisplayMode {
    /// Indicator label shown when a run starts.
    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Monitor => "Modo Monitor",
            DisplayMode::Client => "Modo Cliente",
        }
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "monitor" => Ok(DisplayMode::Monitor),
            "cliente" | "client" => Ok(DisplayMode::Client),
            other => Err(format!("modo desconhecido: {other}")),
        }
    }
}

/// One reported entry: a step outcome, the abort notice, or the final
/// summary. Created when a step completes and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub title: String,
    pub body: Value,
    pub success: bool,
    pub mode: DisplayMode,
}

/// Destination for finished records.
pub trait ReportSink {
    fn emit(&mut self, record: &FlowRecord);
}

/// Applies the redaction policy and forwards records to the sink.
pub struct Reporter<S> {
    mode: DisplayMode,
    sink: S,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(mode: DisplayMode, sink: S) -> Self {
        Self { mode, sink }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Redacts `body` according to the mode and emits the record.
    pub fn report(&mut self, title: &str, body: Value, success: bool) {
        let record = FlowRecord {
            title: title.to_string(),
            body: redact(&body, self.mode),
            success,
            mode: self.mode,
        };
        self.sink.emit(&record);
    }

    /// Reports a transport-level failure: the raw error in monitor mode,
    /// a generic notice in client mode.
    pub fn report_transport(&mut self, title: &str, error: &dyn std::fmt::Display) {
        let body = match self.mode {
            DisplayMode::Monitor => Value::String(error.to_string()),
            DisplayMode::Client => {
                Value::String("Falha na comunicação com o servidor".to_string())
            }
        };
        let record = FlowRecord {
            title: title.to_string(),
            body,
            success: false,
            mode: self.mode,
        };
        self.sink.emit(&record);
    }
}

/// Pure, idempotent redaction transform.
///
/// Monitor mode passes the payload through verbatim. Client mode replaces
/// any payload that discloses an identifier, an order list, or an error
/// body with a status-only summary, and scrubs plain text that inlines an
/// identifier.
pub fn redact(body: &Value, mode: DisplayMode) -> Value {
    match mode {
        DisplayMode::Monitor => body.clone(),
        DisplayMode::Client => redact_client(body),
    }
}

fn redact_client(body: &Value) -> Value {
    match body {
        Value::String(text) if text.contains("usuarioId:") => {
            Value::String("Processando requisição...".to_string())
        }
        Value::Object(fields) => {
            // The interesting payload sits under the "data" envelope when
            // the record came from an HTTP call; bare objects are scanned
            // directly.
            let data = fields.get("data").unwrap_or(body);

            if let Some(pedidos) = data.get("pedidos").and_then(Value::as_array) {
                json!({ "status": format!("{} pedidos encontrados", pedidos.len()) })
            } else if let Some(erro) = data.get("erro").and_then(Value::as_str) {
                json!({ "status": format!("Erro: {erro}") })
            } else if contains_usuario_id(body) {
                json!({ "status": "ID gerado com sucesso" })
            } else {
                body.clone()
            }
        }
        _ => body.clone(),
    }
}

fn contains_usuario_id(value: &Value) -> bool {
    match value {
        Value::Object(fields) => {
            fields.contains_key("usuarioId") || fields.values().any(contains_usuario_id)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    fn cadastro_body() -> Value {
        json!({
            "status": 200,
            "data": { "usuarioId": 12_345 },
            "request": { "nome": "Usuário Teste", "email": "usuario@teste.com" }
        })
    }

    fn pedidos_body() -> Value {
        json!({
            "status": 200,
            "data": { "pedidos": [{ "id": 1 }, { "id": 2 }, { "id": 3 }] },
            "usuarioId": 12_345
        })
    }

    fn erro_body() -> Value {
        json!({
            "status": 504,
            "data": { "erro": "Gateway Timeout" },
            "usuarioId": 12_345
        })
    }

    #[test]
    fn test_monitor_mode_passes_payloads_verbatim() {
        for body in [cadastro_body(), pedidos_body(), erro_body()] {
            assert_eq!(redact(&body, DisplayMode::Monitor), body);
        }
    }

    #[test]
    fn test_client_mode_hides_identifier() {
        let redacted = redact(&cadastro_body(), DisplayMode::Client);
        assert_eq!(redacted, json!({ "status": "ID gerado com sucesso" }));
    }

    #[test]
    fn test_client_mode_summarizes_order_list() {
        let redacted = redact(&pedidos_body(), DisplayMode::Client);
        assert_eq!(redacted, json!({ "status": "3 pedidos encontrados" }));
    }

    #[test]
    fn test_client_mode_keeps_only_error_message() {
        let redacted = redact(&erro_body(), DisplayMode::Client);
        assert_eq!(redacted, json!({ "status": "Erro: Gateway Timeout" }));
    }

    #[test]
    fn test_client_mode_scrubs_identifier_in_plain_text() {
        let body = Value::String("usuarioId: 12345".to_string());
        assert_eq!(
            redact(&body, DisplayMode::Client),
            Value::String("Processando requisição...".to_string())
        );

        let harmless = Value::String("Enviando requisição...".to_string());
        assert_eq!(redact(&harmless, DisplayMode::Client), harmless);
    }

    #[test]
    fn test_client_mode_hides_identifier_echo_on_message_payloads() {
        let body = json!({
            "status": 200,
            "data": { "mensagem": "Login realizado com sucesso" },
            "usuarioId": 12_345
        });
        let redacted = redact(&body, DisplayMode::Client);
        assert!(!contains_usuario_id(&redacted));
    }

    #[test]
    fn test_redaction_is_idempotent() {
        for body in [
            cadastro_body(),
            pedidos_body(),
            erro_body(),
            Value::String("usuarioId: 99".to_string()),
            json!({ "status": 200, "data": { "mensagem": "ok" } }),
        ] {
            let once = redact(&body, DisplayMode::Client);
            let twice = redact(&once, DisplayMode::Client);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_reporter_redacts_before_emitting() {
        let sink = RecordingSink::new();
        let mut reporter = Reporter::new(DisplayMode::Client, sink.clone());
        reporter.report("Cadastro Realizado com Sucesso", cadastro_body(), true);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, json!({ "status": "ID gerado com sucesso" }));
        assert!(records[0].success);
        assert_eq!(records[0].mode, DisplayMode::Client);
    }

    #[test]
    fn test_transport_report_is_generic_in_client_mode() {
        let sink = RecordingSink::new();
        let mut reporter = Reporter::new(DisplayMode::Client, sink.clone());
        reporter.report_transport("Erro na Requisição de Login", &"connection refused");

        let records = sink.records();
        assert_eq!(
            records[0].body,
            Value::String("Falha na comunicação com o servidor".to_string())
        );
        assert!(!records[0].success);
    }

    #[test]
    fn test_transport_report_is_verbatim_in_monitor_mode() {
        let sink = RecordingSink::new();
        let mut reporter = Reporter::new(DisplayMode::Monitor, sink.clone());
        reporter.report_transport("Erro na Requisição de Login", &"connection refused");

        assert_eq!(
            sink.records()[0].body,
            Value::String("connection refused".to_string())
        );
    }

    #[test]
    fn test_display_mode_parsing() {
        assert_eq!("monitor".parse::<DisplayMode>(), Ok(DisplayMode::Monitor));
        assert_eq!("Cliente".parse::<DisplayMode>(), Ok(DisplayMode::Client));
        assert_eq!("client".parse::<DisplayMode>(), Ok(DisplayMode::Client));
        assert!("dashboard".parse::<DisplayMode>().is_err());
    }
}
