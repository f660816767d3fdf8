use vmon_core::{CheckpointInfo, CheckpointObserver};

use std::io::Write;

/// Writes each checkpoint hit as a JSON object on it's own line.
pub struct JsonObserver {
    out: Box<dyn Write>,
}

impl JsonObserver {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }
}

impl CheckpointObserver for JsonObserver {
    fn checkpoint_hit(&mut self, info: &CheckpointInfo) {
        let res = serde_json::to_writer(&mut self.out, info)
            .map_err(|err| err.to_string())
            .and_then(|()| writeln!(self.out).map_err(|err| err.to_string()));
        if let Err(err) = res {
            warn!("failed to write checkpoint hit #{}: {err}", info.id);
        }
    }
}

/// Writes each checkpoint hit as the record of the binary remote protocol.
pub struct BinaryObserver {
    out: Box<dyn Write>,
}

impl BinaryObserver {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }
}

impl CheckpointObserver for BinaryObserver {
    fn checkpoint_hit(&mut self, info: &CheckpointInfo) {
        if let Err(err) = self.out.write_all(&info.to_bytes()) {
            warn!("failed to write checkpoint hit #{}: {err}", info.id);
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
struct Buf(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

#[cfg(test)]
impl Write for Buf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
fn store_hit() -> CheckpointInfo {
    use vmon_util::{MemSpace, Ops};

    CheckpointInfo {
        id: 2,
        hit: true,
        space: MemSpace::Computer,
        start: 0xd020,
        end: 0xd020,
        ops: Ops::STORE,
        stop: true,
        enabled: true,
        temporary: false,
        hit_count: 1,
        ignore_count: 0,
        condition: None,
        command: None,
    }
}

#[test]
fn json_lines() {
    let buf = Buf::default();
    let mut observer = JsonObserver::new(Box::new(buf.clone()));
    let info = store_hit();
    observer.checkpoint_hit(&info);
    observer.checkpoint_hit(&info);

    let text = String::from_utf8(buf.0.borrow().clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        r#"{"id":2,"hit":true,"space":"c","start":53280,"end":53280,"ops":2,"stop":true,"enabled":true,"temporary":false,"hit_count":1,"ignore_count":0,"condition":null,"command":null}"#,
    );
}

#[test]
fn binary_records() {
    let buf = Buf::default();
    let mut observer = BinaryObserver::new(Box::new(buf.clone()));
    observer.checkpoint_hit(&store_hit());
    observer.checkpoint_hit(&store_hit());

    let bytes = buf.0.borrow();
    assert_eq!(bytes.len(), 2 * CheckpointInfo::BINARY_SIZE);
    assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
    assert_eq!(bytes[11], 0x02);
    assert_eq!(bytes[CheckpointInfo::BINARY_SIZE..], bytes[..CheckpointInfo::BINARY_SIZE]);
}
