//! The RFC 959 Representation Type (`TYPE`) command
//
// The argument specifies the representation type as described
// in the Section on Data Representation and Storage.  Several
// types take a second parameter.  The first parameter is
// denoted by a single Telnet character, as is the second
// Format parameter for ASCII and EBCDIC; the second parameter
// for local byte is a decimal integer to indicate Bytesize.
// The parameters are separated by a <SP> (Space, ASCII code
// 32).
//
// Only A and I are supported, without a second parameter.

use super::handler::{CommandContext, CommandHandler};
use crate::{
    auth::UserDetail,
    server::{
        reply::{Reply, ReplyCode},
        transfer::{TransferError, TransferErrorKind, TransferMode},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

/// `TYPE A` or `TYPE I`
#[derive(Debug)]
pub struct Type {
    arg: String,
}

impl Type {
    /// A TYPE with the argument as the client sent it.
    pub fn new(arg: impl Into<String>) -> Self {
        Type { arg: arg.into() }
    }
}

/// Parses the argument of TYPE. The first character is case insensitive.
pub fn parse_type(arg: &str) -> Result<TransferMode, TransferError> {
    let syntax_error = || TransferError::new(TransferErrorKind::SyntaxError, format!("TYPE {}", arg.trim()).trim_end());
    let mut tokens = arg.split_whitespace();
    let (Some(token), None) = (tokens.next(), tokens.next()) else {
        return Err(syntax_error());
    };
    match token {
        "A" | "a" => Ok(TransferMode::Ascii),
        "I" | "i" => Ok(TransferMode::Binary),
        _ => Err(syntax_error()),
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Type
where
    User: UserDetail + 'static,
    Storage: StorageBackend<User> + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError> {
        let mode = parse_type(&self.arg)?;
        let mut session = args.session.lock().await;
        session.state.mode = mode;
        Ok(Reply::new_with_string(ReplyCode::CommandOkay, format!("Type set to {}.", mode)))
    }
}
