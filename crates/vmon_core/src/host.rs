use vmon_util::{Addr, MemSpace, Reg};

/// Raster line and cycle of the video chip, shown when a checkpoint is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub line: u32,
    pub cycle: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Not supported by this machine")]
    Unsupported,

    #[error("Invalid register {0}")]
    InvalidRegister(Reg),

    #[error("{0}")]
    Failed(String),
}

/// The emulated machine as seen by the monitor. The monitor never runs the machine itself, it
/// only inspects and modifies it.
pub trait Host {
    /// Read a register of the active processor of 'space'. Returns 'None' if the processor
    /// doesn't have the register.
    fn register(&self, space: MemSpace, reg: Reg) -> Option<u16>;

    fn set_register(&mut self, space: MemSpace, reg: Reg, val: u16) -> Result<(), HostError>;

    /// The registers of the active processor of 'space' in the order they are shown.
    fn registers(&self, space: MemSpace) -> Vec<Reg>;

    /// Read a byte, with any side effects reading the address may have.
    fn read(&mut self, addr: Addr) -> u8;

    /// Read a byte without side effects. 'bank' selects another bank than the one currently
    /// visible to the processor.
    fn peek(&self, addr: Addr, bank: Option<&str>) -> u8;

    fn write(&mut self, addr: Addr, val: u8);

    /// Disassemble the instruction at 'addr'. Returns the text and the length of the
    /// instruction in bytes.
    fn disassemble(&self, addr: Addr, bank: Option<&str>) -> (String, u16);

    /// The names of the banks of 'space'.
    fn banks(&self, _space: MemSpace) -> Vec<String> {
        Vec::new()
    }

    fn timing(&self, _space: MemSpace) -> Option<Timing> {
        None
    }

    /// The processor models which can be active in 'space'.
    fn cpu_models(&self, _space: MemSpace) -> Vec<&'static str> {
        Vec::new()
    }

    /// The active processor model of 'space'.
    fn cpu_model(&self, _space: MemSpace) -> Option<&'static str> {
        None
    }

    /// The program counter of processor 'model' in 'space', even if it isn't active.
    fn model_pc(&self, _space: MemSpace, _model: &str) -> Option<u16> {
        None
    }

    fn set_cpu_model(&mut self, _space: MemSpace, _model: &str) -> Result<(), HostError> {
        Err(HostError::Unsupported)
    }

    /// Return addresses on the stack of 'space', innermost first.
    fn stack_frames(&self, _space: MemSpace) -> Vec<u16> {
        Vec::new()
    }

    /// Assemble a single instruction at 'addr'. Returns the length of the instruction.
    fn assemble(&mut self, _addr: Addr, _ins: &str) -> Result<u16, HostError> {
        Err(HostError::Unsupported)
    }

    /// Send a command to the disk drive of 'space'. Returns the status reply.
    fn disk_command(&mut self, _space: MemSpace, _cmd: &str) -> Result<String, HostError> {
        Err(HostError::Unsupported)
    }
}
