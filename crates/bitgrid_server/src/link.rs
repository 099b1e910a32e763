//! Inter-server seam links: forwarding one server's output bus onto
//! another server's input bus over its own BGCF connection.

use bitgrid_common::Direction;
use std::net::TcpStream;

/// Selects how much of a linked bus gets forwarded to the peer each
/// subcycle, trading link bandwidth against latching delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkForward {
    /// Send the full lane value on every subcycle.
    Both,
    /// Send only the lanes whose phase (A or B, by `(x+y)` parity) just
    /// became active this subcycle, holding the rest at their last sent
    /// value.
    Phase,
    /// Send the full lane value only on B (odd) subcycles.
    Cycle,
}

impl LinkForward {
    /// Parses a forwarding policy from the CLI's `--link-forward` spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "both" => Some(LinkForward::Both),
            "phase" => Some(LinkForward::Phase),
            "cycle" | "bonly" => Some(LinkForward::Cycle),
            _ => None,
        }
    }
}

/// An established outbound seam link: this server owns the connection to
/// the peer and pushes `SET_INPUTS`/`STEP` frames to it after each local
/// subcycle.
pub struct LinkState {
    /// The connection to the peer server.
    pub stream: TcpStream,
    /// Which local edge the seam sits on.
    pub direction: Direction,
    /// The local output bus feeding the seam.
    pub local_out: String,
    /// The peer's input bus the seam drives.
    pub remote_in: String,
    /// Peer host, kept for the link's lookup key.
    pub host: String,
    /// Peer port, kept for the link's lookup key.
    pub port: u16,
    /// Negotiated lane count.
    pub lanes: u16,
    /// Lane indices whose seam coordinate has even `(x+y)` parity (phase A).
    pub fresh_a: Vec<usize>,
    /// Lane indices whose seam coordinate has odd `(x+y)` parity (phase B).
    pub fresh_b: Vec<usize>,
    /// Local subcycle counter since this link was established.
    pub cycle: u64,
    /// Last value actually sent, used by [`LinkForward::Phase`] to hold
    /// stale lanes steady between refreshes.
    pub last_sent: u64,
}

impl LinkState {
    /// The table key this link is stored under, matching the composite
    /// `direction:local_out->host:port:remote_in` identity used to reject
    /// duplicate LINK requests and to target UNLINK.
    pub fn key(&self) -> String {
        format!(
            "{}:{}->{}:{}:{}",
            self.direction, self.local_out, self.host, self.port, self.remote_in
        )
    }
}

/// Splits `coords[..lanes]` into phase-A (even `x+y`) and phase-B (odd
/// `x+y`) lane indices.
pub fn fresh_lane_partition(coords: &[(u16, u16)]) -> (Vec<usize>, Vec<usize>) {
    let mut a = Vec::new();
    let mut b = Vec::new();
    for (i, (x, y)) in coords.iter().enumerate() {
        if (*x as u32 + *y as u32) % 2 == 0 {
            a.push(i);
        } else {
            b.push(i);
        }
    }
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_by_coordinate_parity() {
        let coords = [(0, 0), (0, 1), (1, 0), (1, 1)];
        let (a, b) = fresh_lane_partition(&coords);
        assert_eq!(a, vec![0, 3]);
        assert_eq!(b, vec![1, 2]);
    }

    #[test]
    fn parse_accepts_bonly_as_cycle_alias() {
        assert_eq!(LinkForward::parse("bonly"), Some(LinkForward::Cycle));
        assert_eq!(LinkForward::parse("cycle"), Some(LinkForward::Cycle));
        assert_eq!(LinkForward::parse("nonsense"), None);
    }
}
