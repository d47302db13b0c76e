use std::collections::HashSet;

use tracing::debug;

use crate::{
    classfile::cpool::{skip_class_body, ConstPool, Entry, Reader, MAGIC},
    error::ClassError,
    mapping::SymbolMap,
};

/// Rewrite the field/method name constants of one class file.
///
/// A `Utf8` entry qualifies for renaming when it is the *name* half of a
/// `NameAndType` that is itself referenced by a Fieldref / Methodref /
/// InterfaceMethodref / Dynamic / InvokeDynamic entry. Descriptor halves,
/// class names and string constants never qualify. Indices are never
/// touched, only the payload bytes of qualifying entries, so the rest of
/// the class file can be copied through untouched.
///
/// A class containing no mapped names comes back byte-identical.
pub fn remap_class(data: &[u8], map: &SymbolMap) -> Result<Vec<u8>, ClassError> {
    let mut r = Reader::new(data);
    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(ClassError::BadMagic(magic));
    }
    r.take(4)?; // minor_version, major_version

    let pool_start = r.pos();
    let mut pool = ConstPool::parse(&mut r)?;
    let body_start = r.pos();
    skip_class_body(&mut r)?;

    let renamable = collect_renamable(&pool)?;

    let mut changed = false;
    for idx in renamable {
        let Some(Some(Entry::Utf8(bytes))) = pool.entries.get_mut(idx as usize) else {
            continue;
        };
        // Non-UTF-8 (exotic MUTF-8) names can never match a mapping key.
        let replacement = match std::str::from_utf8(bytes) {
            Ok(text) => {
                let mapped = map.resolve(text);
                if mapped == text {
                    None
                } else {
                    debug!("renaming {} -> {}", text, mapped);
                    Some(mapped.as_bytes().to_vec())
                }
            }
            Err(_) => None,
        };
        if let Some(new_bytes) = replacement {
            *bytes = new_bytes;
            changed = true;
        }
    }

    if !changed {
        return Ok(data.to_vec());
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..pool_start]);
    pool.write(&mut out);
    out.extend_from_slice(&data[body_start..]);
    Ok(out)
}

/// Pool indices of the `Utf8` entries that denote a field/method name.
fn collect_renamable(pool: &ConstPool) -> Result<HashSet<u16>, ClassError> {
    let mut renamable = HashSet::new();
    for entry in pool.entries.iter().flatten() {
        let nat_idx = match entry {
            Entry::MemberRef { name_and_type, .. } => *name_and_type,
            Entry::DynamicRef { name_and_type, .. } => *name_and_type,
            _ => continue,
        };
        let Some(Entry::NameAndType { name, .. }) = pool.get(nat_idx) else {
            return Err(ClassError::BadIndex(nat_idx));
        };
        let Some(Entry::Utf8(_)) = pool.get(*name) else {
            return Err(ClassError::BadIndex(*name));
        };
        renamable.insert(*name);
    }
    Ok(renamable)
}
