use counsel_core::models::{AgentName, AgentStatus};
use counsel_core::{
    AnalysisSession, AnalysisState, CaseApiClient, CaseBackend, IntakeFlow, IntakeStep,
    ResultsView, SessionOptions, UploadDocument,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse(events: &[(&str, serde_json::Value)]) -> String {
    events
        .iter()
        .map(|(name, data)| format!("event: {}\ndata: {}\n\n", name, data))
        .collect()
}

fn fast_options() -> SessionOptions {
    SessionOptions {
        poll_interval: Duration::from_millis(50),
        banner_interval: Duration::from_millis(50),
    }
}

async fn wait_for(
    session: &AnalysisSession,
    predicate: impl Fn(&AnalysisState) -> bool,
) -> AnalysisState {
    let mut rx = session.watch();
    let wait = async {
        loop {
            {
                let state = rx.borrow_and_update();
                if predicate(&*state) {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return session.state();
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("session never reached the expected state")
}

async fn mount_intake(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/cases/process-documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "caseTitle": "Acme v. Widgets",
            "caseType": "Contract Dispute",
            "plaintiffName": "Acme Corp",
            "defendantName": "Widgets LLC",
            "jurisdiction": "Delaware",
            "moneyAtStake": "2500000",
            "caseDescription": "Widgets LLC failed to deliver under the supply agreement."
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/cases"))
        .and(body_json(json!({
            "title": "Acme v. Widgets",
            "facts": "Widgets LLC failed to deliver under the supply agreement.",
            "jurisdiction": "Delaware",
            "stakes": "2500000"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "case_id": "abc123",
            "status": "created"
        })))
        .expect(1)
        .mount(server)
        .await;
}

mod intake_to_analysis_tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_submit_and_follow_first_agent() {
        let server = MockServer::start().await;
        mount_intake(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/cases/abc123/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse(&[
                        ("agent_started", json!({"agent": "Harvey"})),
                        (
                            "agent_completed",
                            json!({"agent": "Harvey", "content": "Strategy text"}),
                        ),
                    ])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cases/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "case": {"case_id": "abc123", "title": "Acme v. Widgets", "status": "running"}
            })))
            .mount(&server)
            .await;

        let client = Arc::new(CaseApiClient::new(server.uri()).unwrap());

        let mut flow = IntakeFlow::new();
        flow.upload(
            client.as_ref(),
            vec![UploadDocument::new("complaint.pdf", b"%PDF-1.4".to_vec())],
        )
        .await
        .unwrap();
        assert_eq!(flow.step(), &IntakeStep::Summary);
        assert!(flow.extraction_error().is_none());
        assert_eq!(flow.form().stakes_range, "1m-5m");

        flow.form_mut().confirmed = true;
        let handoff = flow.submit(client.as_ref()).await.unwrap();
        assert_eq!(handoff.case_id, "abc123");
        assert_eq!(
            flow.step(),
            &IntakeStep::Analysis {
                case_id: "abc123".to_string()
            }
        );

        let backend: Arc<dyn CaseBackend> = client;
        let session = AnalysisSession::start(backend, &handoff.case_id, fast_options()).await;
        let state = wait_for(&session, |s| {
            s.agent(AgentName::Harvey).status == AgentStatus::Complete
        })
        .await;
        session.cancel();

        let harvey = state.agent(AgentName::Harvey);
        assert_eq!(harvey.output.as_text(), Some("Strategy text"));
        for name in [AgentName::Louis, AgentName::Tanner, AgentName::Jessica] {
            assert_eq!(state.agent(name).status, AgentStatus::Pending);
        }
        assert!(!state.is_terminal());
    }

    #[tokio::test]
    async fn test_extraction_failure_falls_back_to_manual_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cases/process-documents"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "not a PDF"})),
            )
            .mount(&server)
            .await;

        let client = CaseApiClient::new(server.uri()).unwrap();
        let mut flow = IntakeFlow::new();
        flow.upload(&client, vec![UploadDocument::new("notes.txt", b"hello".to_vec())])
            .await
            .unwrap();

        assert_eq!(flow.step(), &IntakeStep::Summary);
        assert!(flow.extraction_error().is_some());
        assert_eq!(flow.form().uploaded_files, vec!["notes.txt".to_string()]);
        assert!(flow.form().case_title.is_empty());
    }
}

mod completed_case_tests {
    use super::*;

    #[tokio::test]
    async fn test_finished_case_skips_stream_and_renders_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cases/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "case": {"case_id": "abc123", "title": "Acme v. Widgets", "status": "completed"},
                "arguments": [
                    {"argument_id": "a1", "agent": "Harvey", "content": "Move to dismiss"}
                ],
                "strategy": {
                    "strategy_id": "s1",
                    "final_strategy": "**Settle** before discovery",
                    "rationale": {"risk_assessment": "Low exposure"}
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cases/abc123/stream"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Arc::new(CaseApiClient::new(server.uri()).unwrap());
        let backend: Arc<dyn CaseBackend> = client.clone();
        let session = AnalysisSession::start(backend, "abc123", fast_options()).await;

        let state = session.state();
        assert!(state.is_complete());
        assert_eq!(state.agent(AgentName::Harvey).status, AgentStatus::Complete);
        assert_eq!(
            state.agent(AgentName::Jessica).output.as_text(),
            Some("**Settle** before discovery")
        );

        let view = ResultsView::load(client.as_ref(), "abc123").await.unwrap();
        assert_eq!(view.header().title, "Acme v. Widgets");
        let panel = view.strategy_panel().unwrap();
        assert_eq!(panel.content[0].plain_text(), "Settle before discovery");
        assert!(panel.rationale.is_some());
        assert_eq!(view.argument_cards().len(), 1);
    }
}
