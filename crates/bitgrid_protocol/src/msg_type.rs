//! BGCF message type codes.

/// The one-byte message type tag carried by every BGCF frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgType {
    /// Either direction: advertises/acknowledges grid dimensions.
    Hello = 0x01,
    /// Host to device: one chunk of an assembled bitstream.
    LoadChunk = 0x02,
    /// Host to device: apply the most recently completed chunk session.
    Apply = 0x03,
    /// Host to device: advance the emulator by `cycles` subcycles.
    Step = 0x04,
    /// Host to device: merge a name to u64 TLV map into current inputs.
    SetInputs = 0x05,
    /// Host to device: request a sampled output snapshot.
    GetOutputs = 0x06,
    /// Device to host: a name to u64 TLV map of sampled outputs.
    Outputs = 0x07,
    /// Host to device: close the current connection.
    Quit = 0x08,
    /// Host to device: stop the listener and exit.
    Shutdown = 0x09,
    /// Host to device: establish an inter-server seam link.
    Link = 0x0A,
    /// Host to device: tear down all seam links.
    Unlink = 0x0B,
    /// Device to host: a link was established, with accepted lane count.
    LinkAck = 0x0C,
    /// Device to host: an error occurred processing the prior frame.
    Error = 0x7F,
}

impl MsgType {
    /// The wire code for this message type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Builds a message type from its wire code, if recognized.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(MsgType::Hello),
            0x02 => Some(MsgType::LoadChunk),
            0x03 => Some(MsgType::Apply),
            0x04 => Some(MsgType::Step),
            0x05 => Some(MsgType::SetInputs),
            0x06 => Some(MsgType::GetOutputs),
            0x07 => Some(MsgType::Outputs),
            0x08 => Some(MsgType::Quit),
            0x09 => Some(MsgType::Shutdown),
            0x0A => Some(MsgType::Link),
            0x0B => Some(MsgType::Unlink),
            0x0C => Some(MsgType::LinkAck),
            0x7F => Some(MsgType::Error),
            _ => None,
        }
    }
}
