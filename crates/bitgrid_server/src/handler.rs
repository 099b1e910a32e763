//! Per-connection BGCF message dispatch.

use crate::chunk_session::ChunkSession;
use crate::error::ServerError;
use crate::link::{fresh_lane_partition, LinkForward, LinkState};
use crate::state::Shared;
use bitgrid_common::Direction;
use bitgrid_ir::Source;
use bitgrid_protocol::{
    decode_name_u64_map, encode_name_u64_map, pack_frame, try_parse_frame, ErrorPayload, Frame,
    HelloPayload, LinkAckPayload, LinkPayload, LoadChunkPayload, MsgType, StepPayload,
};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_millis(500);
const PEER_TIMEOUT: Duration = Duration::from_secs(2);

enum ConnectionOutcome {
    Continue,
    Quit,
}

/// Drives one client connection until it disconnects, sends `QUIT`, or
/// sends `SHUTDOWN` (which also flags the listener to stop accepting).
pub fn handle_client(mut stream: TcpStream, shared: Arc<Shared>, shutdown: Arc<AtomicBool>) {
    let peer = stream.peer_addr().ok();
    if shared.verbose {
        if let Some(addr) = peer {
            eprintln!("[bitgrid_server] connected: {addr}");
        }
    }
    let _ = stream.set_read_timeout(Some(READ_TIMEOUT));
    let mut buf: Vec<u8> = Vec::new();
    let mut seq: u16 = 0;
    let mut scratch = [0u8; 4096];

    'conn: loop {
        loop {
            let (frame, consumed) = try_parse_frame(&buf);
            if consumed == 0 {
                break;
            }
            buf.drain(..consumed);
            let Some(frame) = frame else { continue };
            if !frame.crc_ok {
                if shared.verbose {
                    eprintln!("[bitgrid_server] dropped frame with bad CRC");
                }
                continue;
            }
            match dispatch(&frame, &mut stream, &shared, &shutdown, &mut seq) {
                ConnectionOutcome::Continue => {}
                ConnectionOutcome::Quit => break 'conn,
            }
        }

        match stream.read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&scratch[..n]),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue
            }
            Err(_) => break,
        }
    }

    let mut state = shared.state.lock().expect("state mutex poisoned");
    for (_, link) in state.links.drain() {
        let _ = link.stream.shutdown(std::net::Shutdown::Both);
    }
    drop(state);
    if shared.verbose {
        if let Some(addr) = peer {
            eprintln!("[bitgrid_server] disconnected: {addr}");
        }
    }
}

fn send_frame(stream: &mut TcpStream, msg_type: MsgType, payload: &[u8], seq: u16) {
    let _ = stream.write_all(&pack_frame(msg_type.code(), payload, seq, 0));
}

fn dispatch(
    frame: &Frame,
    stream: &mut TcpStream,
    shared: &Arc<Shared>,
    shutdown: &Arc<AtomicBool>,
    seq: &mut u16,
) -> ConnectionOutcome {
    let Some(msg_type) = MsgType::from_code(frame.msg_type) else {
        if shared.verbose {
            eprintln!("[bitgrid_server] unrecognized message type {:#04x}", frame.msg_type);
        }
        return ConnectionOutcome::Continue;
    };

    match msg_type {
        MsgType::Hello => {
            let (width, height) = {
                let state = shared.state.lock().expect("state mutex poisoned");
                let p = state.program();
                (p.width, p.height)
            };
            let payload = HelloPayload {
                width,
                height,
                proto_version: bitgrid_protocol::VERSION as u16,
                features: 0,
            }
            .to_bytes();
            send_frame(stream, MsgType::Hello, &payload, *seq);
            *seq = seq.wrapping_add(1);
        }
        MsgType::LoadChunk => {
            if let Ok(chunk) = LoadChunkPayload::parse(&frame.payload) {
                let mut state = shared.state.lock().expect("state mutex poisoned");
                let session = state
                    .sessions
                    .entry(chunk.session)
                    .or_insert_with(|| ChunkSession::new(chunk.total));
                session.write_chunk(chunk.offset, &chunk.chunk);
            }
        }
        MsgType::Apply => {
            let mut state = shared.state.lock().expect("state mutex poisoned");
            let ready = state
                .sessions
                .iter()
                .filter(|(_, s)| s.is_complete())
                .map(|(id, _)| *id)
                .max();
            if let Some(id) = ready {
                let data = state.sessions[&id].buffer().to_vec();
                if let Err(e) = state.emulator.load_bitstream(&data) {
                    drop(state);
                    let err = ErrorPayload {
                        code: 1,
                        message: format!("APPLY failed: {e}"),
                    }
                    .to_bytes();
                    send_frame(stream, MsgType::Error, &err, *seq);
                    *seq = seq.wrapping_add(1);
                }
            }
        }
        MsgType::SetInputs => {
            let updates = decode_name_u64_map(&frame.payload);
            let mut state = shared.state.lock().expect("state mutex poisoned");
            for (name, value) in updates {
                if state.current_inputs.contains_key(&name) {
                    state.current_inputs.insert(name, value);
                }
            }
        }
        MsgType::Step => {
            let cycles = StepPayload::parse(&frame.payload).map(|s| s.cycles).unwrap_or(1);
            let forwarded = frame.flags != 0;
            step(shared, cycles, forwarded);
        }
        MsgType::GetOutputs => {
            let outputs: BTreeMap<String, u64> = {
                let state = shared.state.lock().expect("state mutex poisoned");
                state.emulator.sample_outputs(&state.current_inputs).into_iter().collect()
            };
            let payload = encode_name_u64_map(&outputs);
            send_frame(stream, MsgType::Outputs, &payload, *seq);
            *seq = seq.wrapping_add(1);
        }
        MsgType::Link => handle_link(&frame.payload, stream, shared, seq),
        MsgType::Unlink => {
            let mut state = shared.state.lock().expect("state mutex poisoned");
            for (_, link) in state.links.drain() {
                let _ = link.stream.shutdown(std::net::Shutdown::Both);
            }
        }
        MsgType::Quit => return ConnectionOutcome::Quit,
        MsgType::Shutdown => {
            shutdown.store(true, Ordering::SeqCst);
            return ConnectionOutcome::Quit;
        }
        MsgType::Outputs | MsgType::LinkAck | MsgType::Error => {
            // Device-to-host message types; a well-behaved client never sends these.
        }
    }
    ConnectionOutcome::Continue
}

fn step(shared: &Arc<Shared>, cycles: u32, forwarded: bool) {
    let has_links = {
        let state = shared.state.lock().expect("state mutex poisoned");
        !state.links.is_empty()
    };
    if has_links && !forwarded {
        for _ in 0..cycles {
            step_with_links(shared);
        }
    } else {
        let mut state = shared.state.lock().expect("state mutex poisoned");
        let inputs = state.current_inputs.clone();
        state.emulator.run_stream(&[inputs], cycles, false);
    }
}

/// Advances one subcycle, then forwards the active parity's outputs to
/// every seam link according to the server's forwarding policy.
fn step_with_links(shared: &Arc<Shared>) {
    let outputs = {
        let mut state = shared.state.lock().expect("state mutex poisoned");
        let inputs = state.current_inputs.clone();
        state.emulator.run_stream(&[inputs.clone()], 1, false);
        state.emulator.sample_outputs(&inputs)
    };

    let mut state = shared.state.lock().expect("state mutex poisoned");
    let forward = shared.link_forward;
    for link in state.links.values_mut() {
        let value = outputs.get(&link.local_out).copied().unwrap_or(0);
        let send_value = match forward {
            LinkForward::Both => {
                link.last_sent = value;
                Some(value)
            }
            LinkForward::Phase => {
                let mask_a: u64 = link.fresh_a.iter().fold(0u64, |acc, &i| acc | (1 << i));
                let mask_b: u64 = link.fresh_b.iter().fold(0u64, |acc, &i| acc | (1 << i));
                let v = if link.cycle % 2 == 0 {
                    (link.last_sent & !mask_a) | (value & mask_a)
                } else {
                    (link.last_sent & !mask_b) | (value & mask_b)
                };
                link.last_sent = v;
                Some(v)
            }
            LinkForward::Cycle => {
                if link.cycle % 2 == 0 {
                    None
                } else {
                    link.last_sent = value;
                    Some(value)
                }
            }
        };
        link.cycle += 1;

        if let Some(v) = send_value {
            let mut map = BTreeMap::new();
            map.insert(link.remote_in.clone(), v);
            let payload = encode_name_u64_map(&map);
            let _ = link.stream.write_all(&pack_frame(MsgType::SetInputs.code(), &payload, 0, 0));
        }
        // The forwarded flag stops the peer from cascading a second round
        // of link forwarding off this STEP.
        let step_payload = StepPayload { cycles: 1 }.to_bytes();
        let _ = link.stream.write_all(&pack_frame(MsgType::Step.code(), &step_payload, 0, 1));
    }
}

fn handle_link(payload: &[u8], stream: &mut TcpStream, shared: &Arc<Shared>, seq: &mut u16) {
    let cfg = match LinkPayload::parse(payload) {
        Ok(c) => c,
        Err(e) => {
            let err = ErrorPayload {
                code: 1,
                message: format!("LINK parse error: {e}"),
            }
            .to_bytes();
            send_frame(stream, MsgType::Error, &err, *seq);
            *seq = seq.wrapping_add(1);
            return;
        }
    };

    match establish_link(&cfg, shared) {
        Ok(link) => {
            let lanes = link.lanes;
            let key = link.key();
            let mut state = shared.state.lock().expect("state mutex poisoned");
            state.links.insert(key, link);
            drop(state);
            let ack = LinkAckPayload { lanes }.to_bytes();
            send_frame(stream, MsgType::LinkAck, &ack, *seq);
            *seq = seq.wrapping_add(1);
        }
        Err(e) => {
            let err = ErrorPayload {
                code: 1,
                message: format!("LINK failed: {e}"),
            }
            .to_bytes();
            send_frame(stream, MsgType::Error, &err, *seq);
            *seq = seq.wrapping_add(1);
        }
    }
}

fn peer_send_and_recv(peer: &mut TcpStream, frame_bytes: &[u8]) -> Result<Option<Frame>, ServerError> {
    peer.write_all(frame_bytes)?;
    let mut buf = Vec::new();
    let mut scratch = [0u8; 4096];
    loop {
        let (frame, consumed) = try_parse_frame(&buf);
        if consumed > 0 {
            buf.drain(..consumed);
            if frame.is_some() {
                return Ok(frame);
            }
            continue;
        }
        match peer.read(&mut scratch) {
            Ok(0) => return Ok(None),
            Ok(n) => buf.extend_from_slice(&scratch[..n]),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn peer_hello(peer: &mut TcpStream) -> Result<(u16, u16), ServerError> {
    let hello = HelloPayload {
        width: 0,
        height: 0,
        proto_version: bitgrid_protocol::VERSION as u16,
        features: 0,
    }
    .to_bytes();
    let frame_bytes = pack_frame(MsgType::Hello.code(), &hello, 0, 0);
    match peer_send_and_recv(peer, &frame_bytes)? {
        Some(f) if f.msg_type == MsgType::Hello.code() => {
            let parsed = HelloPayload::parse(&f.payload).map_err(|_| ServerError::PeerHelloFailed)?;
            Ok((parsed.width, parsed.height))
        }
        _ => Err(ServerError::PeerHelloFailed),
    }
}

/// Derives the `(x, y)` grid coordinate a given lane of an output bus
/// sits at, for seam-geometry purposes. A bus bound directly to cell
/// outputs carries its own coordinates; anything else (a bare input
/// passthrough, a constant) is synthesized from the edge direction,
/// matching the far column/row a real seam of that width would occupy.
fn seam_coordinate(src: &Source, lane: u16, direction: Direction, width: u16, height: u16) -> (u16, u16) {
    if let Source::Cell { x, y, .. } = src {
        return (*x, *y);
    }
    match direction {
        Direction::E => (width.saturating_sub(1), lane),
        Direction::W => (0, lane),
        Direction::N => (lane, 0),
        Direction::S => (lane, height.saturating_sub(1)),
    }
}

fn establish_link(cfg: &LinkPayload, shared: &Arc<Shared>) -> Result<LinkState, ServerError> {
    let addr = (cfg.host.as_str(), cfg.port)
        .to_socket_addrs()?
        .next()
        .ok_or(ServerError::PeerUnreachable)?;
    let mut peer = TcpStream::connect_timeout(&addr, PEER_TIMEOUT)?;
    peer.set_read_timeout(Some(PEER_TIMEOUT))?;
    let (peer_width, peer_height) = peer_hello(&mut peer)?;

    let (coords, lanes) = {
        let state = shared.state.lock().expect("state mutex poisoned");
        let program = state.program();
        let bits = program
            .output_bits
            .get(&cfg.local_out)
            .ok_or_else(|| ServerError::UnknownBus(cfg.local_out.clone()))?;
        let coords: Vec<(u16, u16)> = bits
            .iter()
            .enumerate()
            .map(|(i, src)| seam_coordinate(src, i as u16, cfg.direction, program.width, program.height))
            .collect();
        let seam_width = match cfg.direction {
            Direction::E | Direction::W => peer_height,
            Direction::N | Direction::S => peer_width,
        };
        let requested = if cfg.lanes > 0 { cfg.lanes } else { coords.len() as u16 };
        let lanes = requested.min(coords.len() as u16).min(seam_width);
        (coords, lanes)
    };

    let (fresh_a, fresh_b) = fresh_lane_partition(&coords[..lanes as usize]);

    Ok(LinkState {
        stream: peer,
        direction: cfg.direction,
        local_out: cfg.local_out.clone(),
        remote_in: cfg.remote_in.clone(),
        host: cfg.host.clone(),
        port: cfg.port,
        lanes,
        fresh_a,
        fresh_b,
        cycle: 0,
        last_sent: 0,
    })
}
