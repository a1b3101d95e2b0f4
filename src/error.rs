use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("failed to load configuration")]
    Config,
    #[display("failed to install the tracing subscriber")]
    Logging,
    #[display("failed to connect to the source system")]
    SourceConnect,
    #[display("failed to set up the destination system")]
    DestinationConnect,
    #[display("migration failed")]
    Migration,
    #[display("HTTP server error")]
    Server,
    #[display("failed to write output")]
    Output,
}
