use std::{
    fs,
    io::{Cursor, Read, Seek, Write},
    path::Path,
};

use tracing::{debug, info};
use zip::{write::FileOptions, CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::{
    classfile::remap_class,
    error::Error,
    manifest::strip_manifest,
    mapping::SymbolMap,
    types::{RenameEvent, Stage, StageProgress},
};

/// Rewritten entries get a fixed modification time (2000-01-01T00:00:00,
/// epoch 0x386D4380) so output does not depend on wall-clock time.
fn canonical_timestamp() -> DateTime {
    DateTime::from_date_and_time(2000, 1, 1, 0, 0, 0).expect("timestamp in zip range")
}

/// Stream `input` into `output`, remapping every `.class` entry through the
/// symbol map and, when `strip_signatures` is set, dropping `.SF`/`.RSA`
/// entries and scrubbing digest attributes from `MANIFEST.MF`. Everything
/// else is raw-copied with its stored metadata intact.
///
/// When `output` is the same file as `input`, the whole rewritten archive is
/// assembled in memory first and flushed only after the source handle is
/// closed, so the source is never truncated while still being read.
pub fn transcode(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    map: &SymbolMap,
    strip_signatures: bool,
    mut report_progress: impl FnMut(RenameEvent),
) -> Result<(), Error> {
    let input = input.as_ref();
    let output = output.as_ref();

    let in_place = output.exists() && fs::canonicalize(input)? == fs::canonicalize(output)?;

    let file = fs::File::open(input)?;
    let mut zip = ZipArchive::new(file)?;

    if in_place {
        debug!("in-place transcode, buffering {} in memory", output.display());
        let cursor = transcode_entries(
            &mut zip,
            Cursor::new(Vec::new()),
            map,
            strip_signatures,
            &mut report_progress,
        )?;
        drop(zip);
        fs::write(output, cursor.into_inner())?;
    } else {
        let out = fs::File::create(output)?;
        transcode_entries(&mut zip, out, map, strip_signatures, &mut report_progress)?;
    }

    report_progress(RenameEvent {
        stage: Stage::Transcoding,
        progress: StageProgress::Done,
    });
    Ok(())
}

fn transcode_entries<R, W>(
    zip: &mut ZipArchive<R>,
    out: W,
    map: &SymbolMap,
    strip_signatures: bool,
    report_progress: &mut impl FnMut(RenameEvent),
) -> Result<W, Error>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut writer = ZipWriter::new(out);
    let rewritten = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(canonical_timestamp());

    let total = zip.len();
    let mut buffer = Vec::new();

    for i in 0..total {
        report_progress(RenameEvent {
            stage: Stage::Transcoding,
            progress: StageProgress::Percentage(i as f32 / total as f32),
        });

        let mut file = zip.by_index(i)?;
        let name = file.name().to_owned();

        if name.ends_with(".class") {
            buffer.clear();
            buffer.reserve(file.size() as usize);
            file.read_to_end(&mut buffer)?;
            let remapped = remap_class(&buffer, map).map_err(|source| Error::MalformedClass {
                path: name.clone(),
                source,
            })?;
            writer.start_file(name, rewritten)?;
            writer.write_all(&remapped)?;
        } else if strip_signatures && (name.ends_with(".SF") || name.ends_with(".RSA")) {
            info!("stripped signature entry {}", name);
        } else if strip_signatures && name.ends_with("MANIFEST.MF") {
            buffer.clear();
            file.read_to_end(&mut buffer)?;
            let stripped = strip_manifest(&buffer);
            writer.start_file(name, rewritten)?;
            writer.write_all(&stripped)?;
            info!("stripped manifest of sha digests");
        } else {
            writer.raw_copy_file(file)?;
        }
    }

    Ok(writer.finish()?)
}
