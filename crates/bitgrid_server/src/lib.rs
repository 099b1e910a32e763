//! A BGCF server: one emulator shared across TCP connections, driven by
//! the wire messages defined in `bitgrid_protocol`, optionally forwarding
//! output buses across seam links to other servers.

#![warn(missing_docs)]

pub mod chunk_session;
pub mod error;
pub mod handler;
pub mod link;
pub mod listener;
pub mod state;

pub use chunk_session::ChunkSession;
pub use error::ServerError;
pub use handler::handle_client;
pub use link::{fresh_lane_partition, LinkForward, LinkState};
pub use listener::serve;
pub use state::{ServerState, Shared};

#[cfg(test)]
mod tests {
    use super::*;
    use bitgrid_ir::Program;
    use bitgrid_protocol::{pack_frame, try_parse_frame, HelloPayload, MsgType};
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;

    fn read_one_frame(stream: &mut TcpStream) -> bitgrid_protocol::Frame {
        let mut buf = Vec::new();
        let mut scratch = [0u8; 1024];
        loop {
            let (frame, consumed) = try_parse_frame(&buf);
            if consumed > 0 {
                buf.drain(..consumed);
            }
            if let Some(frame) = frame {
                return frame;
            }
            let n = stream.read(&mut scratch).expect("read from server");
            assert!(n > 0, "server closed connection before replying");
            buf.extend_from_slice(&scratch[..n]);
        }
    }

    #[test]
    fn hello_then_shutdown_stops_the_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let program = Program::new(4, 2, 0);
        let server = thread::spawn(move || {
            serve("127.0.0.1", port, program, None, LinkForward::Both, false).unwrap();
        });

        // Give the listener a moment to come up.
        thread::sleep(std::time::Duration::from_millis(100));

        let mut client = TcpStream::connect(("127.0.0.1", port)).expect("connect to server");
        client.set_read_timeout(Some(std::time::Duration::from_secs(2))).unwrap();

        let hello = HelloPayload {
            width: 0,
            height: 0,
            proto_version: 1,
            features: 0,
        }
        .to_bytes();
        client.write_all(&pack_frame(MsgType::Hello.code(), &hello, 0, 0)).unwrap();
        let reply = read_one_frame(&mut client);
        assert_eq!(reply.msg_type, MsgType::Hello.code());
        let parsed = HelloPayload::parse(&reply.payload).unwrap();
        assert_eq!((parsed.width, parsed.height), (4, 2));

        client.write_all(&pack_frame(MsgType::Shutdown.code(), &[], 1, 0)).unwrap();
        server.join().expect("server thread panicked");
    }
}
