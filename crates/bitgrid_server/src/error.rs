//! Error types for the server's networking and link-establishment paths.

/// Errors raised while serving connections or establishing seam links.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A networking operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Applying a bitstream to the loaded program failed.
    #[error(transparent)]
    Bitstream(#[from] bitgrid_bitstream::BitstreamError),
    /// A LINK request named a host/port pair that could not be resolved.
    #[error("could not resolve link peer address")]
    PeerUnreachable,
    /// A LINK request's peer did not complete the HELLO handshake.
    #[error("peer did not respond to HELLO handshake")]
    PeerHelloFailed,
    /// A LINK request named an output bus the loaded program doesn't have.
    #[error("unknown output bus '{0}'")]
    UnknownBus(String),
}
