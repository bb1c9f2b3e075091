use std::fmt;

/// A reply to the FTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing is sent back.
    None,
    /// A single line reply.
    CodeAndMsg {
        /// The reply code
        code: ReplyCode,
        /// The text after the code
        msg: String,
    },
    /// A reply spanning multiple lines.
    MultiLine {
        /// The reply code
        code: ReplyCode,
        /// The lines of text
        lines: Vec<String>,
    },
}

/// The reply codes according to RFC 959 that the transfer commands use.
//
// Codes between 100 and 199 indicate marks; codes between 200 and 399 indicate acceptance; codes
// between 400 and 599 indicate rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReplyCode {
    /// 150
    FileStatusOkay = 150,

    /// 200
    CommandOkay = 200,
    /// 226
    ClosingDataConnection = 226,

    /// 350
    FileActionPending = 350,

    /// 421
    ServiceNotAvailable = 421,
    /// 425
    CantOpenDataConnection = 425,
    /// 426
    ConnectionClosed = 426,
    /// 450
    TransientFileError = 450,
    /// 451
    LocalError = 451,
    /// 452
    OutOfSpace = 452,

    /// 500
    CommandSyntaxError = 500,
    /// 501
    ParameterSyntaxError = 501,
    /// 550
    FileError = 550,
    /// 552
    ExceededStorageAllocation = 552,
    /// 553
    BadFileName = 553,
}

impl Reply {
    /// A reply with a static message.
    pub fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    /// A reply with a formatted message.
    pub fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    /// A reply spanning several lines.
    pub fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(|item| format!("{}", item)).collect(),
        }
    }

    /// A no-reply
    pub fn none() -> Self {
        Reply::None
    }

    /// The code of this reply, if there is one.
    pub fn code(&self) -> Option<ReplyCode> {
        match self {
            Reply::None => None,
            Reply::CodeAndMsg { code, .. } | Reply::MultiLine { code, .. } => Some(*code),
        }
    }
}

// Renders the reply the way it goes over the wire, without the final CRLF.
impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::None => Ok(()),
            Reply::CodeAndMsg { code, msg } => write!(f, "{} {}", *code as u32, msg),
            Reply::MultiLine { code, lines } => {
                let code = *code as u32;
                let last = lines.len().saturating_sub(1);
                for (i, line) in lines.iter().enumerate() {
                    if i == last {
                        write!(f, "{} {}", code, line)?;
                    } else {
                        writeln!(f, "{}-{}", code, line)?;
                    }
                }
                Ok(())
            }
        }
    }
}
