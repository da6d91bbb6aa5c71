use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use careline_assistants::testing::ScriptedProvider;
use careline_assistants::{AssistantsProvider, BatchCase, BatchMode, BatchRunner, Orchestrator, PollPolicy};
use careline_checklist::Checklist;
use careline_core::TriageError;

fn setup(provider: &Arc<ScriptedProvider>) -> (Orchestrator, Checklist) {
    let dyn_provider: Arc<dyn AssistantsProvider> = provider.clone();
    let policy = PollPolicy::new(Duration::from_secs(1), Some(Duration::from_secs(30)));
    (
        Orchestrator::new(Some(dyn_provider), policy),
        Checklist::for_locale("pt-BR").unwrap(),
    )
}

fn cases() -> Vec<BatchCase> {
    vec![
        BatchCase::new("dor-no-peito", "Estou com dor no peito"),
        BatchCase::new("febre", "Meu filho está com febre"),
        BatchCase::new("corte", "Cortei a mão"),
    ]
}

#[tokio::test(start_paused = true)]
async fn each_case_gets_its_own_thread_in_order() {
    let provider = Arc::new(ScriptedProvider::completing_with(["Estou aqui."]));
    let (orch, checklist) = setup(&provider);

    let items = BatchRunner::new(&orch, &checklist)
        .run("asst_1", &cases(), BatchMode::default())
        .await
        .unwrap();

    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["dor-no-peito", "febre", "corte"]);

    let threads: Vec<String> = items
        .iter()
        .map(|i| i.outcome.as_ref().unwrap().thread_id.clone())
        .collect();
    assert_eq!(threads, provider.created_threads());
    assert_eq!(threads.iter().collect::<HashSet<_>>().len(), 3);

    for (case, thread) in cases().iter().zip(&threads) {
        let history = provider.thread_messages(thread);
        assert_eq!(history[0].text(), case.message);
    }
}

#[tokio::test(start_paused = true)]
async fn failing_case_is_captured_and_batch_continues() {
    let provider = Arc::new(ScriptedProvider::completing_with(["ok"]).failing_messages_containing("febre"));
    let (orch, checklist) = setup(&provider);

    let items = BatchRunner::new(&orch, &checklist)
        .run("asst_1", &cases(), BatchMode::ContinueOnError)
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
    assert!(items[0].outcome.is_ok());
    assert!(matches!(items[1].outcome, Err(TriageError::Provider(_))));
    assert!(items[2].outcome.is_ok());
    assert_eq!(provider.started_runs().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fail_fast_aborts_on_first_error() {
    let provider = Arc::new(ScriptedProvider::completing_with(["ok"]).failing_messages_containing("febre"));
    let (orch, checklist) = setup(&provider);

    let err = BatchRunner::new(&orch, &checklist)
        .run("asst_1", &cases(), BatchMode::FailFast)
        .await
        .unwrap_err();

    assert!(matches!(err, TriageError::Provider(_)));
    assert_eq!(provider.created_threads().len(), 2);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let provider = Arc::new(ScriptedProvider::completing_with(["ok"]));
    let (orch, checklist) = setup(&provider);
    let runner = BatchRunner::new(&orch, &checklist);

    let err = runner.run("asst_1", &[], BatchMode::default()).await.unwrap_err();
    assert!(matches!(err, TriageError::Validation(_)));

    let err = runner.run("", &cases(), BatchMode::default()).await.unwrap_err();
    assert!(matches!(err, TriageError::Validation(_)));
}

#[tokio::test]
async fn batch_without_credential_is_a_configuration_error() {
    let orch = Orchestrator::new(None, PollPolicy::default());
    let checklist = Checklist::for_locale("pt-BR").unwrap();

    let err = BatchRunner::new(&orch, &checklist)
        .run("asst_1", &cases(), BatchMode::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TriageError::Configuration(_)));
}
