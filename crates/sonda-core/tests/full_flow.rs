//! Full-flow coverage against a live mock backend.

use serde_json::{Value, json};
use sonda_core::testing::RecordingSink;
use sonda_core::{DisplayMode, Flow, FlowRunner, FlowStatus, HttpApi, Reporter};
use sonda_server::{AppState, FaultInjector, router};

async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("server task");
    });
    format!("http://{addr}/api")
}

fn runner(base_url: &str, mode: DisplayMode) -> (FlowRunner<HttpApi, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    let reporter = Reporter::new(mode, sink.clone());
    (FlowRunner::new(HttpApi::new(base_url), reporter), sink)
}

#[tokio::test]
async fn cadastro_flow_succeeds_against_live_server() {
    let base = spawn_server(AppState::default()).await;
    let (mut flow_runner, sink) = runner(&base, DisplayMode::Monitor);

    let status = flow_runner.run(Flow::Cadastro).await;

    assert_eq!(status, FlowStatus::Completed);
    let records = sink.records();
    assert_eq!(records[0].title, "Iniciando Cadastro de Usuário");
    assert_eq!(records[1].title, "Cadastro Realizado com Sucesso");

    // monitor mode keeps the identifier and the request echo
    let id = records[1].body["data"]["usuarioId"]
        .as_u64()
        .expect("usuarioId present");
    assert!((10_000..99_999).contains(&id));
    assert_eq!(records[1].body["request"]["nome"], "Usuário Teste");
}

#[tokio::test]
async fn cadastro_flow_redacts_in_client_mode() {
    let base = spawn_server(AppState::default()).await;
    let (mut flow_runner, sink) = runner(&base, DisplayMode::Client);

    let status = flow_runner.run(Flow::Cadastro).await;

    assert_eq!(status, FlowStatus::Completed);
    let records = sink.records();
    assert_eq!(records[1].body, json!({ "status": "ID gerado com sucesso" }));
}

#[tokio::test]
async fn listagem_flow_reaches_a_terminal_state() {
    // Registration draws a random identifier, so login/alteração may or
    // may not trip their divisibility rules; both outcomes are valid.
    let state = AppState::new(FaultInjector::with_rate(0.0));
    let base = spawn_server(state).await;
    let (mut flow_runner, sink) = runner(&base, DisplayMode::Monitor);

    let status = flow_runner.run(Flow::Listagem).await;

    let titles = sink.titles();
    match status {
        FlowStatus::Completed => {
            assert_eq!(titles.last().unwrap(), "Fluxo de Teste Completo");
            assert_eq!(titles.len(), 9);
        }
        FlowStatus::Failed => {
            assert_eq!(titles.last().unwrap(), "Fluxo de Listagem Abortado");
        }
        other => panic!("unexpected terminal status {other:?}"),
    }
}

#[tokio::test]
async fn listagem_step_failure_forced_by_rate() {
    // rate 1.0 guarantees the listing fails whenever the flow gets there;
    // retry until registration draws an identifier that clears login and
    // alteração, so the abort is attributable to the listing step.
    let state = AppState::new(FaultInjector::with_rate(1.0));
    let base = spawn_server(state).await;

    for _ in 0..50 {
        let (mut flow_runner, sink) = runner(&base, DisplayMode::Monitor);
        let status = flow_runner.run(Flow::Listagem).await;
        assert_eq!(status, FlowStatus::Failed);

        let titles = sink.titles();
        if titles.iter().any(|t| t == "Erro na Listagem de Pedidos") {
            assert_eq!(titles.last().unwrap(), "Fluxo de Listagem Abortado");
            let abort = sink.records().pop().unwrap();
            assert_eq!(
                abort.body,
                Value::String(
                    "O teste foi interrompido devido a falha na etapa de listagem de pedidos."
                        .to_string()
                )
            );
            return;
        }
    }
    panic!("no run reached the listing step in 50 attempts");
}

#[tokio::test]
async fn unreachable_server_aborts_with_transport_record() {
    // Bind and drop a listener so the port is very likely unused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut flow_runner, sink) = runner(&format!("http://{addr}/api"), DisplayMode::Client);
    let status = flow_runner.run(Flow::Cadastro).await;

    assert_eq!(status, FlowStatus::Failed);
    let records = sink.records();
    assert_eq!(records[1].title, "Erro na Requisição de Cadastro");
    assert_eq!(
        records[1].body,
        Value::String("Falha na comunicação com o servidor".to_string())
    );
    assert_eq!(records[2].title, "Fluxo de Cadastro Abortado");
}
