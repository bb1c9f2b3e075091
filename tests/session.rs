#![allow(missing_docs)]

pub mod common;

use common::{Harness, MockConnection};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::mpsc;
use unftp_xfer::{
    options::TransferOptions,
    server::{
        ControlChanMsg, IdleTimer, TransferMode,
        commands::{Abor, Rest, Retr, Stor, Type},
    },
};

#[tokio::test]
async fn type_switches_the_representation() {
    let h = Harness::new(TransferOptions::default());
    assert_eq!(h.session.lock().await.state().mode(), TransferMode::Binary);

    assert_eq!(h.run(Type::new("A")).await.to_string(), "200 Type set to A.");
    assert_eq!(h.session.lock().await.state().mode(), TransferMode::Ascii);

    assert_eq!(h.run(Type::new("i")).await.to_string(), "200 Type set to I.");
    assert_eq!(h.session.lock().await.state().mode(), TransferMode::Binary);
}

#[tokio::test]
async fn invalid_type_keeps_the_representation() {
    let h = Harness::new(TransferOptions::default());
    h.run(Type::new("A")).await;

    assert_eq!(h.run(Type::new("E")).await.to_string(), "500 'TYPE E' not understood.");
    assert_eq!(h.run(Type::new("")).await.to_string(), "500 'TYPE' not understood.");
    assert_eq!(h.run(Type::new("A N")).await.to_string(), "500 'TYPE A N' not understood.");
    assert_eq!(h.session.lock().await.state().mode(), TransferMode::Ascii);
}

#[tokio::test]
async fn invalid_rest_keeps_the_offset() {
    let h = Harness::new(TransferOptions::default());
    h.run(Rest::new("10")).await;

    assert_eq!(
        h.run(Rest::new("-5")).await.to_string(),
        "501 REST requires a value greater than or equal to 0."
    );
    assert_eq!(h.run(Rest::new("")).await.to_string(), "500 'REST' not understood.");
    assert_eq!(h.session.lock().await.state().restart_offset(), 10);
}

#[tokio::test]
async fn abor_needs_something_to_abort() {
    let h = Harness::new(TransferOptions::default());

    assert_eq!(h.run(Abor::new("")).await.to_string(), "500 No command to abort.");
    assert_eq!(h.run(Abor::new("now")).await.to_string(), "500 'ABOR now' not understood.");
}

#[tokio::test]
async fn abor_clears_a_request_that_arrived_between_transfers() {
    let h = Harness::new(TransferOptions::default());
    h.abort_handle().await.request();

    assert!(h.session.lock().await.state().abort_requested());
    assert_eq!(h.run(Abor::new("")).await.to_string(), "226 Abort successful");
    assert!(!h.session.lock().await.state().abort_requested());
}

#[tokio::test]
async fn upload_overwrite_resume_abort_and_missing_download() {
    let mut h = Harness::new(TransferOptions::default());
    let original: Vec<u8> = (0..200u8).collect();

    h.attach(MockConnection::uploading([&original[..]])).await;
    assert_eq!(h.run(Stor::new("report.txt")).await.to_string(), "226 Transfer complete.");
    assert_eq!(h.read("report.txt"), original);

    h.attach(MockConnection::uploading([&b"other"[..]])).await;
    assert_eq!(
        h.run(Stor::new("report.txt")).await.to_string(),
        "550 report.txt: Overwrite permission denied"
    );
    assert_eq!(h.read("report.txt"), original);

    h.reconfigure(TransferOptions::default().allow_overwrite(true).allow_store_restart(true));
    h.run(Rest::new("100")).await;
    h.attach(MockConnection::uploading([&b"tail"[..]])).await;
    assert_eq!(h.run(Stor::new("report.txt")).await.to_string(), "226 Transfer complete.");
    let stored = h.read("report.txt");
    assert_eq!(stored.len(), 200);
    assert_eq!(stored[..100], original[..100]);
    assert_eq!(&stored[100..104], b"tail");
    assert_eq!(stored[104..], original[104..]);

    assert_eq!(h.run(Abor::new("")).await.to_string(), "500 No command to abort.");

    h.attach(MockConnection::downloading()).await;
    assert_eq!(
        h.run(Retr::new("missing.txt")).await.to_string(),
        "550 missing.txt: No such file or directory"
    );
}

#[tokio::test(start_paused = true)]
async fn idle_session_is_closed() {
    let h = Harness::new(TransferOptions::default().no_transfer_timeout(Some(Duration::from_secs(5))));
    let (tx, mut rx) = mpsc::channel(4);
    let timer = {
        let session = h.session.lock().await;
        IdleTimer::for_session(&*session, tx, None)
    };
    assert!(timer.is_some());

    tokio::time::sleep(Duration::from_secs(6)).await;

    match rx.recv().await {
        Some(ControlChanMsg::CommandChannelReply(reply)) => assert_eq!(
            reply.to_string(),
            "421 No Transfer Timeout (5 seconds): closing control connection."
        ),
        other => panic!("expected the timeout reply, got {:?}", other),
    }
    assert!(matches!(rx.recv().await, Some(ControlChanMsg::ExitControlLoop)));
}

#[tokio::test]
async fn idle_timer_can_be_disabled() {
    let h = Harness::new(TransferOptions::default().no_transfer_timeout(None));
    let (tx, _rx) = mpsc::channel(4);

    let session = h.session.lock().await;
    assert!(IdleTimer::for_session(&*session, tx, None).is_none());
}
