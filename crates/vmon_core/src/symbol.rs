use vmon_util::MemSpace;

use std::collections::BTreeMap;

/// Labels of each memspace. Names are stored without the leading '.'.
#[derive(Default)]
pub struct Symbols {
    tables: [BTreeMap<String, u16>; MemSpace::COUNT],
}

impl Symbols {
    pub fn add(&mut self, space: MemSpace, name: &str, loc: u16) {
        if let Some(old) = self.tables[space.index()].insert(name.to_string(), loc) {
            debug!("label .{name} moved from ${old:04x} to ${loc:04x}");
        }
    }

    pub fn remove(&mut self, space: MemSpace, name: &str) -> Option<u16> {
        self.tables[space.index()].remove(name)
    }

    pub fn get(&self, space: MemSpace, name: &str) -> Option<u16> {
        self.tables[space.index()].get(name).copied()
    }

    /// The first label of 'loc', used to annotate disassembly.
    pub fn name_of(&self, space: MemSpace, loc: u16) -> Option<&str> {
        self.tables[space.index()]
            .iter()
            .find(|(_, val)| **val == loc)
            .map(|(name, _)| name.as_str())
    }

    /// Labels of 'space' sorted by name.
    pub fn iter(&self, space: MemSpace) -> impl Iterator<Item = (&str, u16)> {
        self.tables[space.index()].iter().map(|(name, loc)| (name.as_str(), *loc))
    }

    pub fn clear(&mut self, space: MemSpace) {
        self.tables[space.index()].clear();
    }
}
