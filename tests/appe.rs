#![allow(missing_docs)]

pub mod common;

use common::{Harness, MockConnection};
use pretty_assertions::assert_eq;
use unftp_xfer::{
    notification::Completion,
    options::TransferOptions,
    server::commands::{Abor, Appe, Rest, Stor},
};

#[tokio::test]
async fn appends_to_an_existing_file() {
    let h = Harness::new(TransferOptions::default().allow_store_restart(true));
    h.write("log.txt", b"line 1\n");
    h.attach(MockConnection::uploading(["line 2\n", "line 3\n"])).await;

    let reply = h.run(Appe::new("log.txt")).await;

    assert_eq!(reply.to_string(), "226 Transfer complete.");
    assert_eq!(h.read("log.txt"), b"line 1\nline 2\nline 3\n");
    let records = h.listener.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bytes, 14);
    assert_eq!(records[0].completion, Completion::Complete);
    assert!(!h.session.lock().await.state().append_mode());
}

#[tokio::test]
async fn creates_a_missing_file() {
    let h = Harness::new(TransferOptions::default());
    h.attach(MockConnection::uploading(["first line\n"])).await;

    let reply = h.run(Appe::new("new.log")).await;

    assert_eq!(reply.to_string(), "226 Transfer complete.");
    assert_eq!(h.read("new.log"), b"first line\n");
}

#[tokio::test]
async fn is_a_restart_for_policy_purposes() {
    let h = Harness::new(TransferOptions::default().allow_overwrite(true));
    h.write("log.txt", b"line 1\n");
    h.attach(MockConnection::uploading(["line 2\n"])).await;

    let reply = h.run(Appe::new("log.txt")).await;

    assert_eq!(reply.to_string(), "451 log.txt: Append/Restart not permitted, try again.");
    assert_eq!(h.read("log.txt"), b"line 1\n");
    let session = h.session.lock().await;
    assert!(!session.state().append_mode());
    assert_eq!(session.state().restart_offset(), 0);
    assert!(session.has_data_connection());
}

#[tokio::test]
async fn ignores_a_pending_restart_offset() {
    let h = Harness::new(TransferOptions::default().allow_store_restart(true));
    h.write("log.txt", b"0123456789");

    h.run(Rest::new("2")).await;
    h.attach(MockConnection::uploading(["abc"])).await;
    let reply = h.run(Appe::new("log.txt")).await;

    assert_eq!(reply.to_string(), "226 Transfer complete.");
    assert_eq!(h.read("log.txt"), b"0123456789abc");
}

#[tokio::test]
async fn does_not_turn_the_next_store_into_an_append() {
    let h = Harness::new(TransferOptions::default().allow_overwrite(true).allow_store_restart(true));
    h.write("log.txt", b"old");

    h.attach(MockConnection::uploading(["+new"])).await;
    assert_eq!(h.run(Appe::new("log.txt")).await.to_string(), "226 Transfer complete.");
    assert_eq!(h.read("log.txt"), b"old+new");

    h.attach(MockConnection::uploading(["fresh"])).await;
    assert_eq!(h.run(Stor::new("log.txt")).await.to_string(), "226 Transfer complete.");
    assert_eq!(h.read("log.txt"), b"fresh");
}

#[tokio::test]
async fn aborted_append_removes_the_whole_file() {
    let h = Harness::new(TransferOptions::default().allow_store_restart(true));
    h.write("log.txt", b"line 1\n");
    let abort = h.abort_handle().await;
    h.attach(MockConnection::uploading(["line 2\n", "line 3\n", "line 4\n"]).aborting_after(1, abort))
        .await;

    let reply = h.run(Appe::new("log.txt")).await;

    assert_eq!(reply.to_string(), "426 Transfer aborted. Data connection closed.");
    assert!(!h.exists("log.txt"));
    assert!(h.session.lock().await.handles().is_empty());
    assert_eq!(h.run(Abor::new("")).await.to_string(), "226 Abort successful");
}

#[tokio::test]
async fn empty_name_is_a_syntax_error() {
    let h = Harness::new(TransferOptions::default());

    assert_eq!(h.run(Appe::new("")).await.to_string(), "500 'APPE' not understood.");
    assert!(!h.session.lock().await.state().append_mode());
}
