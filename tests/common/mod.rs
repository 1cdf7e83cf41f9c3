#![allow(dead_code)]

use std::collections::VecDeque;

use layoutview::ntfs::structs::{
    MetadataOptimization, QueryFileLayoutInput, FILE_LAYOUT_NAME_ENTRY_PRIMARY,
    STREAM_LAYOUT_ENTRY_RESIDENT,
};
use layoutview::{LayoutError, LayoutSource, LayoutTree, PageStatus, Result};

// ============================================================================
// Response page builder
// ============================================================================

pub struct NameSpec {
    pub flags: u32,
    pub parent: u64,
    pub name: String,
}

impl NameSpec {
    pub fn primary(name: &str, parent: u64) -> Self {
        Self::with_flags(FILE_LAYOUT_NAME_ENTRY_PRIMARY, name, parent)
    }

    pub fn with_flags(flags: u32, name: &str, parent: u64) -> Self {
        Self {
            flags,
            parent,
            name: name.to_string(),
        }
    }
}

pub struct StreamSpec {
    pub version: u32,
    pub flags: u32,
    pub type_code: u32,
    pub attribute_flags: u32,
    pub end_of_file: i64,
    pub allocation_size: i64,
    pub identifier: String,
    pub extent_count: Option<u32>,
}

impl StreamSpec {
    /// Unnamed resident `$DATA`
    pub fn resident_data(end_of_file: i64) -> Self {
        Self {
            version: 1,
            flags: STREAM_LAYOUT_ENTRY_RESIDENT,
            type_code: 0x80,
            attribute_flags: 0,
            end_of_file,
            allocation_size: 0,
            identifier: String::new(),
            extent_count: None,
        }
    }

    pub fn named(identifier: &str, end_of_file: i64) -> Self {
        Self {
            identifier: identifier.to_string(),
            ..Self::resident_data(end_of_file)
        }
    }

    pub fn with_extents(mut self, count: u32) -> Self {
        self.extent_count = Some(count);
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

#[derive(Default, Clone, Copy)]
pub struct InfoSpec {
    pub times: [i64; 4],
    pub attributes: u32,
    pub owner_id: u32,
    pub security_id: u32,
    pub usn: i64,
    /// Emit the 60-byte block carrying this id
    pub storage_reserve_id: Option<u32>,
}

pub struct EntrySpec {
    pub version: u32,
    pub flags: u32,
    pub attributes: u32,
    pub reference_number: u64,
    pub info: Option<InfoSpec>,
    pub names: Vec<NameSpec>,
    pub streams: Vec<StreamSpec>,
}

impl EntrySpec {
    pub fn file(reference_number: u64) -> Self {
        Self {
            version: 1,
            flags: 0,
            attributes: 0x20,
            reference_number,
            info: Some(InfoSpec::default()),
            names: Vec::new(),
            streams: Vec::new(),
        }
    }

    pub fn name(mut self, name: NameSpec) -> Self {
        self.names.push(name);
        self
    }

    pub fn stream(mut self, stream: StreamSpec) -> Self {
        self.streams.push(stream);
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 40];
        put_u32(&mut buf, 0, self.version);
        put_u32(&mut buf, 8, self.flags);
        put_u32(&mut buf, 12, self.attributes);
        put_u64(&mut buf, 16, self.reference_number);

        if let Some(info) = &self.info {
            let at = buf.len();
            for time in info.times {
                buf.extend_from_slice(&time.to_le_bytes());
            }
            buf.extend_from_slice(&info.attributes.to_le_bytes());
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&info.owner_id.to_le_bytes());
            buf.extend_from_slice(&info.security_id.to_le_bytes());
            buf.extend_from_slice(&info.usn.to_le_bytes());
            if let Some(id) = info.storage_reserve_id {
                buf.extend_from_slice(&id.to_le_bytes());
            }
            let length = buf.len() - at;
            put_u32(&mut buf, 32, at as u32);
            put_u32(&mut buf, 36, length as u32);
            pad8(&mut buf);
        }

        let mut prev: Option<usize> = None;
        for name in &self.names {
            let at = buf.len();
            link(&mut buf, prev, 0, 24, at);

            let raw = utf16(&name.name);
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&name.flags.to_le_bytes());
            buf.extend_from_slice(&name.parent.to_le_bytes());
            buf.extend_from_slice(&(raw.len() as u32).to_le_bytes());
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&raw);
            pad8(&mut buf);
            prev = Some(at);
        }

        let mut prev: Option<usize> = None;
        for stream in &self.streams {
            let at = buf.len();
            link(&mut buf, prev, 4, 28, at);

            let raw = utf16(&stream.identifier);
            buf.extend_from_slice(&stream.version.to_le_bytes());
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&stream.flags.to_le_bytes());
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&stream.allocation_size.to_le_bytes());
            buf.extend_from_slice(&stream.end_of_file.to_le_bytes());
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&stream.type_code.to_le_bytes());
            buf.extend_from_slice(&stream.attribute_flags.to_le_bytes());
            buf.extend_from_slice(&(raw.len() as u32).to_le_bytes());
            buf.extend_from_slice(&raw);
            pad8(&mut buf);

            if let Some(count) = stream.extent_count {
                let extents_at = buf.len();
                put_u32(&mut buf, at + 12, (extents_at - at) as u32);
                buf.extend_from_slice(&1u32.to_le_bytes());
                buf.extend_from_slice(&0u32.to_le_bytes());
                buf.extend_from_slice(&count.to_le_bytes());
                buf.extend_from_slice(&0u32.to_le_bytes());
            }
            prev = Some(at);
        }

        buf
    }
}

/// Chain `at` after `prev`, or record it as the entry's first record
fn link(buf: &mut [u8], prev: Option<usize>, next_field: usize, first_field: usize, at: usize) {
    match prev {
        Some(prev) => put_u32(buf, prev + next_field, (at - prev) as u32),
        None => put_u32(buf, first_field, at as u32),
    }
}

/// Encode a full response page: header followed by chained file entries
pub fn build_page(entries: &[EntrySpec]) -> Vec<u8> {
    let mut page = vec![0u8; 16];
    put_u32(&mut page, 0, entries.len() as u32);
    if !entries.is_empty() {
        put_u32(&mut page, 4, 16);
    }

    let mut prev: Option<usize> = None;
    for entry in entries {
        let at = page.len();
        if let Some(prev) = prev {
            put_u32(&mut page, prev + 4, (at - prev) as u32);
        }
        page.extend_from_slice(&entry.encode());
        pad8(&mut page);
        prev = Some(at);
    }

    page
}

pub fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn get_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub fn put_u64(buf: &mut [u8], at: usize, value: u64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

fn pad8(buf: &mut Vec<u8>) {
    while buf.len() % 8 != 0 {
        buf.push(0);
    }
}

fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

// ============================================================================
// Scripted layout source
// ============================================================================

pub enum Reply {
    Page(Vec<u8>),
    EndOfData,
    Fail(u32),
}

pub struct ScriptedSource {
    pub reference_number: u64,
    pub optimization: Option<MetadataOptimization>,
    pub replies: VecDeque<Reply>,
    pub inputs: Vec<QueryFileLayoutInput>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            reference_number: 0x1_0000_0000_002a,
            optimization: None,
            replies: replies.into(),
            inputs: Vec::new(),
        }
    }
}

impl LayoutSource for ScriptedSource {
    fn file_reference_number(&mut self) -> Result<u64> {
        Ok(self.reference_number)
    }

    fn query_layout(&mut self, input: &QueryFileLayoutInput, output: &mut [u8]) -> Result<PageStatus> {
        self.inputs.push(input.clone());

        match self.replies.pop_front() {
            Some(Reply::Page(page)) => {
                let len = page.len().min(output.len());
                output[..len].copy_from_slice(&page[..len]);
                Ok(PageStatus::Data(len))
            }
            Some(Reply::EndOfData) | None => Ok(PageStatus::EndOfData),
            Some(Reply::Fail(code)) => Err(LayoutError::from_win32(code, "DeviceIoControl(0x00090277)")),
        }
    }

    fn metadata_optimization(&mut self) -> Option<MetadataOptimization> {
        self.optimization
    }
}

// ============================================================================
// Tree helpers
// ============================================================================

/// (name, value) of every top-level node in natural order
pub fn root_facts(tree: &LayoutTree) -> Vec<(String, String)> {
    tree.roots()
        .iter()
        .filter_map(|&id| tree.find(id))
        .map(|node| (node.name.clone(), node.value.clone()))
        .collect()
}

pub fn root_value(tree: &LayoutTree, name: &str) -> Option<String> {
    root_facts(tree)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, value)| value)
}

/// (name, value) of the children of a node
pub fn child_facts(tree: &LayoutTree, id: u64) -> Vec<(String, String)> {
    tree.find(id)
        .map(|node| node.children.clone())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|child| tree.find(child))
        .map(|node| (node.name.clone(), node.value.clone()))
        .collect()
}

/// Top-level nodes with the given name, in natural order
pub fn roots_named(tree: &LayoutTree, name: &str) -> Vec<u64> {
    tree.roots()
        .iter()
        .copied()
        .filter(|&id| tree.find(id).map(|node| node.name == name).unwrap_or(false))
        .collect()
}
