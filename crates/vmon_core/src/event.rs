use vmon_util::{MemSpace, Ops};

use serde::Serialize;

/// Snapshot of a checkpoint sent to observers. Ids may be reused once all checkpoints have
/// been deleted, so observers shouldn't treat them as stable across that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointInfo {
    pub id: u32,
    /// If the checkpoint has just been hit.
    pub hit: bool,
    pub space: MemSpace,
    pub start: u16,
    pub end: u16,
    pub ops: Ops,
    pub stop: bool,
    pub enabled: bool,
    pub temporary: bool,
    pub hit_count: u32,
    pub ignore_count: u32,
    pub condition: Option<String>,
    pub command: Option<String>,
}

impl CheckpointInfo {
    /// Size of the record in the binary remote protocol.
    pub const BINARY_SIZE: usize = 23;

    /// Encode as the little endian checkpoint record of the binary remote protocol.
    pub fn to_bytes(&self) -> [u8; Self::BINARY_SIZE] {
        let mut bytes = [0; Self::BINARY_SIZE];
        bytes[0..4].copy_from_slice(&self.id.to_le_bytes());
        bytes[4] = self.hit as u8;
        bytes[5..7].copy_from_slice(&self.start.to_le_bytes());
        bytes[7..9].copy_from_slice(&self.end.to_le_bytes());
        bytes[9] = self.stop as u8;
        bytes[10] = self.enabled as u8;
        bytes[11] = self.ops.0;
        bytes[12] = self.temporary as u8;
        bytes[13..17].copy_from_slice(&self.hit_count.to_le_bytes());
        bytes[17..21].copy_from_slice(&self.ignore_count.to_le_bytes());
        bytes[21] = self.condition.is_some() as u8;
        bytes[22] = self.space.index() as u8;
        bytes
    }
}

/// Notified each time a checkpoint is hit, whether or not it stops execution.
pub trait CheckpointObserver {
    /// Must not block. Failures should be handled or logged by the observer itself.
    fn checkpoint_hit(&mut self, _info: &CheckpointInfo) {}
}

impl CheckpointObserver for () {}

#[test]
fn binary_record() {
    let info = CheckpointInfo {
        id: 0x0102,
        hit: true,
        space: MemSpace::Disk9,
        start: 0xc000,
        end: 0xc0ff,
        ops: Ops::LOAD | Ops::STORE,
        stop: false,
        enabled: true,
        temporary: false,
        hit_count: 7,
        ignore_count: 2,
        condition: Some("C:A == $1".to_string()),
        command: None,
    };
    assert_eq!(info.to_bytes(), [
        0x02, 0x01, 0x00, 0x00,
        0x01,
        0x00, 0xc0,
        0xff, 0xc0,
        0x00,
        0x01,
        0x03,
        0x00,
        0x07, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00,
        0x01,
        0x02,
    ]);
}
