/// Surfaced by the demo binaries' TUI, never consumed by `rewind_core`
/// itself. Ported from `net/stats.rs`'s `NetworkStats`.
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}
