use assert_matches::assert_matches;
use mc_api::types::{CapabilitiesResponse, LoginResponse};
use pretty_assertions::assert_eq;
use test_log::test;

use super::*;
use crate::{
    Phase, RecordingView, Screen,
    mock::{Call, MockBackend, capability},
};

fn config(auth_mode: AuthMode) -> SessionConfig {
    SessionConfig {
        auth_mode,
        annotation_delay: Duration::from_secs(3),
        status_poll_interval: None,
    }
}

fn setup(backend: MockBackend, config: SessionConfig) -> (Arc<MockBackend>, Arc<RecordingView>, Arc<ChatSession>) {
    let backend = Arc::new(backend);
    let view = Arc::new(RecordingView::default());
    let session = Arc::new(ChatSession::new(backend.clone(), view.clone(), config));

    (backend, view, session)
}

fn catalogue() -> CapabilitiesResponse {
    CapabilitiesResponse {
        capabilities: vec![
            capability("calculate", "What is 15% of 240?"),
            capability("solve equation", "Solve 2x + 3 = 11"),
        ],
        error: None,
    }
}

#[test(tokio::test)]
async fn test_start_signed_out() {
    let (backend, view, session) = setup(MockBackend::new(), config(AuthMode::Redirect));

    assert!(!session.start().await);

    assert_eq!(view.screen(), Screen::Login);
    assert_eq!(backend.calls(), vec![Call::AuthStatus]);
    assert!(session.capabilities().is_empty());
}

#[test(tokio::test(start_paused = true))]
async fn test_start_signed_in() {
    let (backend, view, session) = setup(MockBackend::new().signed_in("Ada"), SessionConfig {
        status_poll_interval: Some(Duration::from_secs(30)),
        ..config(AuthMode::Redirect)
    });
    backend.push_capabilities(Ok(catalogue()));

    assert!(session.start().await);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(view.screen(), Screen::Main);
    assert_eq!(
        session.auth_state().user.unwrap().display_name(),
        Some("Ada")
    );
    assert_eq!(view.capabilities(), catalogue().capabilities);
    assert_eq!(backend.calls(), vec![
        Call::AuthStatus,
        Call::Capabilities,
        Call::McpStatus,
    ]);
    assert_eq!(
        view.connectivity(),
        Some(Connectivity::Connected { server_url: None })
    );
}

#[test(tokio::test)]
async fn test_login_credentials_loads_capabilities() {
    let (backend, view, session) = setup(MockBackend::new(), config(AuthMode::Credentials));
    session.start().await;

    backend.push_login(Ok(LoginResponse {
        success: true,
        token: Some("abc".to_owned()),
        error: None,
    }));
    backend.always_signed_in("Ada");
    backend.push_capabilities(Ok(catalogue()));

    let outcome = session
        .login(Some(Credentials::new("ada", "secret")))
        .await
        .unwrap();

    assert_eq!(outcome, LoginOutcome::SignedIn);
    assert!(session.is_authenticated());
    assert_eq!(view.screen(), Screen::Main);
    assert_eq!(session.capabilities().len(), 2);
}

#[test(tokio::test)]
async fn test_login_redirect_does_not_load_capabilities() {
    let (backend, view, session) = setup(MockBackend::new(), config(AuthMode::Redirect));

    let outcome = session.login(None).await.unwrap();

    assert_matches!(outcome, LoginOutcome::Redirect(_));
    assert!(view.redirect().is_some());
    assert!(!backend.calls().contains(&Call::Capabilities));
}

#[test(tokio::test)]
async fn test_logout_empties_transcript() {
    let cases = vec![
        ("logout acknowledged", Ok(mc_api::types::Acknowledgement {
            success: Some(true),
        })),
        ("logout fails", Err(mc_api::Error::Api {
            status: 500,
            message: None,
        })),
    ];

    for (name, logout) in cases {
        let (backend, view, session) =
            setup(MockBackend::new().signed_in("Ada"), config(AuthMode::Redirect));
        backend.push_capabilities(Ok(catalogue()));
        backend.push_answer("4", vec![]);
        backend.push_logout(logout);

        session.start().await;
        session.submit("2+2").await;
        assert_eq!(session.transcript().len(), 2, "{name}");
        assert_eq!(view.capabilities().len(), 2, "{name}");

        session.logout().await;

        assert!(session.transcript().is_empty(), "{name}");
        assert!(view.turns().is_empty(), "{name}");
        assert!(session.capabilities().is_empty(), "{name}");
        assert!(view.capabilities().is_empty(), "{name}");
        assert!(!session.is_authenticated(), "{name}");
        assert_eq!(view.screen(), Screen::Login, "{name}");
        assert!(backend.calls().contains(&Call::Logout), "{name}");
    }
}

#[test(tokio::test)]
async fn test_logout_discards_outstanding_reply() {
    let (backend, view, session) = setup(
        MockBackend::new().signed_in("Ada").with_chat_gate(),
        config(AuthMode::Redirect),
    );
    backend.push_answer("too late", vec![]);
    session.start().await;

    let submit = tokio::spawn({
        let session = session.clone();
        async move { session.submit("hello").await }
    });
    while session.pipeline().phase() != Phase::AwaitingReply {
        tokio::task::yield_now().await;
    }

    session.logout().await;
    backend.release_chat();

    assert_matches!(submit.await.unwrap(), SubmitOutcome::Discarded);
    assert!(session.transcript().is_empty());
    assert!(view.turns().is_empty());
    assert_eq!(view.screen(), Screen::Login);
}

#[test(tokio::test)]
async fn test_selected_capability_is_not_sent() {
    let (backend, view, session) =
        setup(MockBackend::new().signed_in("Ada"), config(AuthMode::Redirect));
    backend.push_capabilities(Ok(catalogue()));
    backend.push_answer("36", vec![]);
    session.start().await;

    let selected = session.select_capability(0).unwrap();

    assert_eq!(view.input(), "What is 15% of 240?");
    assert!(backend.chat_requests().is_empty());

    session.submit(&selected.example).await;
    assert_eq!(backend.chat_requests()[0].message, "What is 15% of 240?");
}

#[test(tokio::test)]
async fn test_shutdown_discards_outstanding_reply() {
    let (backend, view, session) = setup(
        MockBackend::new().signed_in("Ada").with_chat_gate(),
        config(AuthMode::Redirect),
    );
    backend.push_answer("too late", vec![]);
    session.start().await;

    let submit = tokio::spawn({
        let session = session.clone();
        async move { session.submit("hello").await }
    });
    while session.pipeline().phase() != Phase::AwaitingReply {
        tokio::task::yield_now().await;
    }

    session.shutdown();
    backend.release_chat();

    assert_matches!(submit.await.unwrap(), SubmitOutcome::Discarded);
    assert_eq!(view.turns().len(), 1);
}

#[test(tokio::test)]
async fn test_refresh_status() {
    let (_backend, view, session) =
        setup(MockBackend::new().signed_in("Ada"), config(AuthMode::Redirect));
    session.start().await;

    let connectivity = session.refresh_status().await;

    assert_eq!(connectivity, Connectivity::Connected { server_url: None });
    assert_eq!(view.connectivity(), Some(connectivity));
}
