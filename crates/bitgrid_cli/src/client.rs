//! `bitgrid client` — open one BGCF connection and issue a single action.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use bitgrid_protocol::{
    decode_name_u64_map, encode_name_u64_map, pack_frame, try_parse_frame, ErrorPayload, Frame,
    HelloPayload, LinkAckPayload, LinkPayload, LoadChunkPayload, MsgType, StepPayload,
};

use crate::{ClientAction, ClientArgs};

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the `bitgrid client` command, issuing exactly one action.
pub fn run(args: &ClientArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect((args.host.as_str(), args.port))?;
    stream.set_read_timeout(Some(RESPONSE_TIMEOUT))?;

    match &args.action {
        ClientAction::Hello => {
            send(&mut stream, MsgType::Hello, &HelloPayload {
                width: 0,
                height: 0,
                proto_version: bitgrid_protocol::VERSION as u16,
                features: 0,
            }.to_bytes())?;
            let reply = recv(&mut stream)?;
            let hello = HelloPayload::parse(&reply.payload)?;
            println!("grid: {}x{}", hello.width, hello.height);
        }
        ClientAction::Load { path, chunk_size } => {
            load(&mut stream, path, *chunk_size)?;
        }
        ClientAction::SetInputs { assignments } => {
            let map = parse_assignments(assignments)?;
            send(&mut stream, MsgType::SetInputs, &encode_name_u64_map(&map))?;
        }
        ClientAction::Step { cycles } => {
            send(&mut stream, MsgType::Step, &StepPayload { cycles: *cycles }.to_bytes())?;
        }
        ClientAction::GetOutputs => {
            send(&mut stream, MsgType::GetOutputs, &[])?;
            let reply = recv(&mut stream)?;
            let outputs = decode_name_u64_map(&reply.payload);
            for (name, value) in &outputs {
                println!("{name} = {value}");
            }
        }
        ClientAction::Link {
            direction,
            local_out,
            remote_in,
            peer_host,
            peer_port,
            lanes,
        } => {
            let payload = LinkPayload {
                direction: (*direction).into(),
                local_out: local_out.clone(),
                remote_in: remote_in.clone(),
                host: peer_host.clone(),
                port: *peer_port,
                lanes: *lanes,
            }
            .to_bytes();
            send(&mut stream, MsgType::Link, &payload)?;
            let reply = recv(&mut stream)?;
            if reply.msg_type == MsgType::LinkAck.code() {
                let ack = LinkAckPayload::parse(&reply.payload)?;
                println!("linked, lanes = {}", ack.lanes);
            } else if reply.msg_type == MsgType::Error.code() {
                let err = ErrorPayload::parse(&reply.payload)?;
                return Err(format!("server rejected LINK: {}", err.message).into());
            }
        }
        ClientAction::Unlink => send(&mut stream, MsgType::Unlink, &[])?,
        ClientAction::Quit => send(&mut stream, MsgType::Quit, &[])?,
        ClientAction::Shutdown => send(&mut stream, MsgType::Shutdown, &[])?,
    }

    Ok(0)
}

fn send(stream: &mut TcpStream, msg_type: MsgType, payload: &[u8]) -> std::io::Result<()> {
    stream.write_all(&pack_frame(msg_type.code(), payload, 0, 0))
}

fn recv(stream: &mut TcpStream) -> Result<Frame, Box<dyn std::error::Error>> {
    let mut buf = Vec::new();
    let mut scratch = [0u8; 4096];
    loop {
        let (frame, consumed) = try_parse_frame(&buf);
        if consumed > 0 {
            buf.drain(..consumed);
        }
        if let Some(frame) = frame {
            return Ok(frame);
        }
        let n = stream.read(&mut scratch)?;
        if n == 0 {
            return Err("connection closed before a reply arrived".into());
        }
        buf.extend_from_slice(&scratch[..n]);
    }
}

fn load(stream: &mut TcpStream, path: &str, chunk_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    let session: u16 = 1;
    for (offset, chunk) in data.chunks(chunk_size.max(1)).scan(0u32, |pos, chunk| {
        let start = *pos;
        *pos += chunk.len() as u32;
        Some((start, chunk))
    }) {
        let payload = LoadChunkPayload {
            session,
            total: data.len() as u32,
            offset,
            chunk: chunk.to_vec(),
        }
        .to_bytes();
        send(stream, MsgType::LoadChunk, &payload)?;
    }
    send(stream, MsgType::Apply, &[])?;
    Ok(())
}

/// Parses `name=value` assignments, accepting decimal or `0x`-prefixed hex.
fn parse_assignments(assignments: &[String]) -> Result<BTreeMap<String, u64>, Box<dyn std::error::Error>> {
    let mut map = BTreeMap::new();
    for item in assignments {
        let (name, raw) = item
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{item}'"))?;
        let value = if let Some(hex) = raw.strip_prefix("0x") {
            u64::from_str_radix(hex, 16)?
        } else {
            raw.parse::<u64>()?
        };
        map.insert(name.to_string(), value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_assignments() {
        let map = parse_assignments(&["west=5".to_string(), "east=0x148".to_string()]).unwrap();
        assert_eq!(map["west"], 5);
        assert_eq!(map["east"], 0x148);
    }

    #[test]
    fn rejects_assignment_without_equals() {
        assert!(parse_assignments(&["west".to_string()]).is_err());
    }
}
