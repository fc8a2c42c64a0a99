/// What went wrong, at the level the user cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    /// A topic or a queue does not exist under the given name
    NotFound,

    /// An AWS call was rejected
    Upstream,

    /// Anything else, e.g. terminal or output failures
    Internal,
}

/// Display global error message in unified format
#[derive(Debug, Clone)]
pub(crate) struct Error {
    kind: Kind,
    message: String,
    details: Option<String>,
}

impl Error {
    pub(crate) fn new(message: &str, details: Option<&str>) -> Self {
        Self::with_kind(Kind::Internal, message, details)
    }

    pub(crate) fn not_found(message: &str, details: Option<&str>) -> Self {
        Self::with_kind(Kind::NotFound, message, details)
    }

    pub(crate) fn upstream(message: &str, details: Option<&str>) -> Self {
        Self::with_kind(Kind::Upstream, message, details)
    }

    fn with_kind(kind: Kind, message: &str, details: Option<&str>) -> Self {
        Error {
            kind,
            message: message.to_string(),
            details: details.map(|d| d.to_string()),
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }
}

/// Display the message and details, as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}\n\n{}", self.message, console::style(details).dim()),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}

/// Automatically convert all eyre error reports
///
/// An `Error` attached anywhere in the chain (usually via `wrap_err`) wins,
/// otherwise the report is shown as an internal failure.
impl From<eyre::ErrReport> for Error {
    fn from(report: eyre::ErrReport) -> Self {
        log::error!("{report:?}");

        report
            .downcast::<Error>()
            .unwrap_or_else(|report| Error::new(&report.to_string(), None))
    }
}
