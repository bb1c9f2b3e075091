use crate::notification::Completion;
use crate::server::Direction;

use lazy_static::*;
use prometheus::{IntCounterVec, register_int_counter_vec};

lazy_static! {
    static ref FTP_XFER_BYTES: IntCounterVec =
        register_int_counter_vec!("ftp_xfer_bytes_total", "Total number of bytes moved over data connections.", &["direction"]).unwrap();
    static ref FTP_XFER_FILES: IntCounterVec = register_int_counter_vec!(
        "ftp_xfer_files_total",
        "Total number of file transfers, by outcome.",
        &["direction", "completion"]
    )
    .unwrap();
}

/// Add the metrics for a transfer that ended.
pub fn add_transfer_metric(direction: Direction, completion: Completion, bytes: u64) {
    let direction = direction_label(direction);
    let completion = match completion {
        Completion::Complete => "complete",
        Completion::Incomplete => "incomplete",
    };
    FTP_XFER_BYTES.with_label_values(&[direction]).inc_by(bytes);
    FTP_XFER_FILES.with_label_values(&[direction, completion]).inc();
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Inbound => "inbound",
        Direction::Outbound => "outbound",
    }
}
