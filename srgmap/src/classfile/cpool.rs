use crate::error::ClassError;

pub const MAGIC: u32 = 0xCAFEBABE;

pub const TAG_UTF8: u8 = 1;
pub const TAG_INTEGER: u8 = 3;
pub const TAG_FLOAT: u8 = 4;
pub const TAG_LONG: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_CLASS: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_FIELDREF: u8 = 9;
pub const TAG_METHODREF: u8 = 10;
pub const TAG_INTERFACE_METHODREF: u8 = 11;
pub const TAG_NAME_AND_TYPE: u8 = 12;
pub const TAG_METHOD_HANDLE: u8 = 15;
pub const TAG_METHOD_TYPE: u8 = 16;
pub const TAG_DYNAMIC: u8 = 17;
pub const TAG_INVOKE_DYNAMIC: u8 = 18;
pub const TAG_MODULE: u8 = 19;
pub const TAG_PACKAGE: u8 = 20;

/// One constant-pool entry. Only the kinds that can lead to a renamable
/// name are parsed into fields; everything else keeps its payload verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Utf8(Vec<u8>),
    NameAndType { name: u16, descriptor: u16 },
    /// Fieldref / Methodref / InterfaceMethodref.
    MemberRef { tag: u8, class: u16, name_and_type: u16 },
    /// Dynamic / InvokeDynamic.
    DynamicRef { tag: u8, bootstrap: u16, name_and_type: u16 },
    Other { tag: u8, payload: Vec<u8> },
}

impl Entry {
    fn write(&self, out: &mut Vec<u8>) {
        match self {
            Entry::Utf8(bytes) => {
                out.push(TAG_UTF8);
                out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            Entry::NameAndType { name, descriptor } => {
                out.push(TAG_NAME_AND_TYPE);
                out.extend_from_slice(&name.to_be_bytes());
                out.extend_from_slice(&descriptor.to_be_bytes());
            }
            Entry::MemberRef {
                tag,
                class,
                name_and_type,
            } => {
                out.push(*tag);
                out.extend_from_slice(&class.to_be_bytes());
                out.extend_from_slice(&name_and_type.to_be_bytes());
            }
            Entry::DynamicRef {
                tag,
                bootstrap,
                name_and_type,
            } => {
                out.push(*tag);
                out.extend_from_slice(&bootstrap.to_be_bytes());
                out.extend_from_slice(&name_and_type.to_be_bytes());
            }
            Entry::Other { tag, payload } => {
                out.push(*tag);
                out.extend_from_slice(payload);
            }
        }
    }
}

/// The constant pool, 1-indexed the way the class file stores it: slot 0 is
/// unused, and the phantom slot after every Long/Double entry is `None`.
#[derive(Debug)]
pub struct ConstPool {
    pub entries: Vec<Option<Entry>>,
}

impl ConstPool {
    pub fn parse(r: &mut Reader<'_>) -> Result<Self, ClassError> {
        let count = r.u16()?;
        let mut entries: Vec<Option<Entry>> = vec![None];
        while (entries.len() as u16) < count {
            let tag = r.u8()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = r.u16()? as usize;
                    Entry::Utf8(r.take(len)?.to_vec())
                }
                TAG_NAME_AND_TYPE => Entry::NameAndType {
                    name: r.u16()?,
                    descriptor: r.u16()?,
                },
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF => Entry::MemberRef {
                    tag,
                    class: r.u16()?,
                    name_and_type: r.u16()?,
                },
                TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => Entry::DynamicRef {
                    tag,
                    bootstrap: r.u16()?,
                    name_and_type: r.u16()?,
                },
                TAG_INTEGER | TAG_FLOAT => Entry::Other {
                    tag,
                    payload: r.take(4)?.to_vec(),
                },
                TAG_LONG | TAG_DOUBLE => Entry::Other {
                    tag,
                    payload: r.take(8)?.to_vec(),
                },
                TAG_CLASS | TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    Entry::Other {
                        tag,
                        payload: r.take(2)?.to_vec(),
                    }
                }
                TAG_METHOD_HANDLE => Entry::Other {
                    tag,
                    payload: r.take(3)?.to_vec(),
                },
                other => return Err(ClassError::UnknownTag(other)),
            };
            let two_slots = matches!(tag, TAG_LONG | TAG_DOUBLE);
            entries.push(Some(entry));
            if two_slots {
                entries.push(None);
            }
        }
        // A Long/Double in the last declared slot overruns the count.
        if entries.len() as u16 != count {
            return Err(ClassError::BadIndex(count));
        }
        Ok(ConstPool { entries })
    }

    pub fn get(&self, idx: u16) -> Option<&Entry> {
        self.entries.get(idx as usize).and_then(Option::as_ref)
    }

    /// Re-serialize with original count, order and indices. Phantom slots
    /// take no bytes.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in self.entries.iter().flatten() {
            entry.write(out);
        }
    }
}

/// Walk the post-pool sections (access flags through class attributes) for
/// length bookkeeping only, so truncated class files are rejected before any
/// output is written. Nothing here is re-encoded.
pub fn skip_class_body(r: &mut Reader<'_>) -> Result<(), ClassError> {
    r.take(6)?; // access_flags, this_class, super_class
    let interfaces = r.u16()? as usize;
    r.take(interfaces * 2)?;
    for _ in 0..2 {
        // fields, then methods
        let members = r.u16()?;
        for _ in 0..members {
            r.take(6)?; // access_flags, name_index, descriptor_index
            skip_attributes(r)?;
        }
    }
    skip_attributes(r)
}

fn skip_attributes(r: &mut Reader<'_>) -> Result<(), ClassError> {
    let count = r.u16()?;
    for _ in 0..count {
        r.take(2)?; // attribute_name_index
        let len = r.u32()? as usize;
        r.take(len)?;
    }
    Ok(())
}

/// Big-endian cursor over a class file.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ClassError> {
        let end = self.pos.checked_add(n).ok_or(ClassError::Truncated)?;
        let slice = self.data.get(self.pos..end).ok_or(ClassError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, ClassError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, ClassError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, ClassError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
