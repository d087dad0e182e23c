//! The upload/result front end: a session state machine, the transport that
//! reaches the compression endpoint, and the flow that drives one compress
//! action from selection to download.

pub mod error;
pub mod flow;
pub mod session;
pub mod transport;

pub use error::ClientError;
pub use flow::{CompressFlow, Download};
pub use session::{CompressionStats, SelectedFile, Stage, UploadSession};
pub use transport::{CompressTransport, HttpTransport, ServerReply};
