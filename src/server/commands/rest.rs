//! Restart of Interrupted Transfer (REST)
//! To avoid having to resend the entire file if the file is only
//! partially transferred, both sides need some way to agree on where in
//! the data stream to restart the data transfer.
//!
//! See also: <https://cr.yp.to/ftp/retr.html>
//!

use super::handler::{CommandContext, CommandHandler};
use crate::{
    auth::UserDetail,
    server::{
        reply::{Reply, ReplyCode},
        transfer::{TransferError, TransferErrorKind},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

/// `REST <offset>`
#[derive(Debug)]
pub struct Rest {
    arg: String,
}

impl Rest {
    /// A REST with the argument as the client sent it.
    pub fn new(arg: impl Into<String>) -> Self {
        Rest { arg: arg.into() }
    }
}

/// Parses the argument of REST: a single non-negative decimal number, optionally preceded by `+`.
/// A missing or extra argument is a syntax error, anything else that is not such a number is an
/// invalid argument.
pub fn parse_offset(arg: &str) -> Result<u64, TransferError> {
    let mut tokens = arg.split_whitespace();
    let (Some(token), None) = (tokens.next(), tokens.next()) else {
        return Err(TransferError::new(TransferErrorKind::SyntaxError, format!("REST {}", arg.trim()).trim_end()));
    };
    let digits = token.strip_prefix('+').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransferError::new(TransferErrorKind::InvalidArgument, "REST"));
    }
    digits.parse().map_err(|e| TransferError::with_source(TransferErrorKind::InvalidArgument, "REST", e))
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Rest
where
    User: UserDetail + 'static,
    Storage: StorageBackend<User> + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError> {
        let offset = parse_offset(&self.arg)?;
        let mut session = args.session.lock().await;
        session.state.restart_offset = offset;
        let msg = format!("Restarting at {}. Send STORE or RETRIEVE to initiate transfer.", offset);
        Ok(Reply::new_with_string(ReplyCode::FileActionPending, msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("100", 100)]
    #[case("+42", 42)]
    #[case(" 7 ", 7)]
    #[case("18446744073709551615", u64::MAX)]
    fn accepts(#[case] arg: &str, #[case] expected: u64) {
        assert_eq!(parse_offset(arg).unwrap(), expected);
    }

    #[rstest]
    #[case("-1")]
    #[case("abc")]
    #[case("12abc")]
    #[case("+")]
    #[case("1.5")]
    #[case("18446744073709551616")]
    fn rejects_as_invalid(#[case] arg: &str) {
        assert_eq!(parse_offset(arg).unwrap_err().kind(), TransferErrorKind::InvalidArgument);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("1 2")]
    fn rejects_as_syntax_error(#[case] arg: &str) {
        assert_eq!(parse_offset(arg).unwrap_err().kind(), TransferErrorKind::SyntaxError);
    }

    #[test]
    fn syntax_error_names_the_command() {
        assert_eq!(parse_offset("").unwrap_err().subject(), "REST");
        assert_eq!(parse_offset("1 2").unwrap_err().subject(), "REST 1 2");
    }
}
