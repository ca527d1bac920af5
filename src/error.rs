//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("no token given (use --token or FOLIO_TOKEN)")]
    MissingToken,
    #[display("could not set up the connection to the document service")]
    Connect,
    #[display("request failed")]
    View,
    #[display("could not write output")]
    Output,
}
