use std::{collections::HashMap, fs, path::Path};

use tracing::{debug, info};
use zip::ZipArchive;

use crate::{
    error::Error,
    types::{RenameEvent, Stage, StageProgress},
};

/// One row of a mapping CSV. `searge` is the preferred old-name column,
/// `param` the fallback; `name` is the new spelling.
#[derive(Debug, Clone)]
pub struct MappingRow {
    pub searge: Option<String>,
    pub param: Option<String>,
    pub name: String,
}

impl MappingRow {
    fn old_name(&self) -> Option<&str> {
        self.searge.as_deref().or(self.param.as_deref())
    }
}

/// Immutable old-name -> new-name lookup, built once per run.
///
/// `resolve` never fails: a name absent from the table comes back unchanged,
/// which is what guarantees that unmapped identifiers survive the rewrite
/// byte-identically.
#[derive(Debug, Default)]
pub struct SymbolMap {
    map: HashMap<String, String>,
}

impl SymbolMap {
    /// Build from rows. A row carrying neither `searge` nor `param` is a
    /// configuration error; later rows overwrite earlier ones.
    pub fn build<I>(rows: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = MappingRow>,
    {
        let mut map = HashMap::new();
        for row in rows {
            let Some(old) = row.old_name() else {
                return Err(Error::Config(
                    "mapping row has no searge or param column".into(),
                ));
            };
            map.insert(old.to_string(), row.name);
        }
        Ok(SymbolMap { map })
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Load every `.csv` resource of the mapping archive into one combined map.
pub fn load_symbol_map(
    path: impl AsRef<Path>,
    mut report_progress: impl FnMut(RenameEvent),
) -> Result<SymbolMap, Error> {
    report_progress(Stage::LoadingMappings.into());

    let file = fs::File::open(path.as_ref())?;
    let mut zip = ZipArchive::new(file)?;

    let csv_names = zip
        .file_names()
        .filter(|name| name.ends_with(".csv"))
        .map(Into::into)
        .collect::<Vec<String>>();

    let mut rows = Vec::new();
    for name in &csv_names {
        let file = zip.by_name(name)?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader.headers()?;
        let searge_idx = headers.iter().position(|h| h == "searge");
        let param_idx = headers.iter().position(|h| h == "param");
        let name_idx = headers
            .iter()
            .position(|h| h == "name")
            .ok_or_else(|| Error::Config(format!("{name}: no name column")))?;
        if searge_idx.is_none() && param_idx.is_none() {
            return Err(Error::Config(format!("{name}: no searge or param column")));
        }

        let mut count = 0usize;
        for record in reader.records() {
            let record = record?;
            let field = |idx: Option<usize>| {
                idx.and_then(|idx| record.get(idx)).map(str::to_string)
            };
            rows.push(MappingRow {
                searge: field(searge_idx),
                param: field(param_idx),
                name: field(Some(name_idx)).unwrap_or_default(),
            });
            count += 1;
        }
        debug!("{}: {} mapping rows", name, count);
    }

    let map = SymbolMap::build(rows)?;
    info!(
        "loaded {} mappings from {} csv resources",
        map.len(),
        csv_names.len()
    );
    report_progress(RenameEvent {
        stage: Stage::LoadingMappings,
        progress: StageProgress::Done,
    });
    Ok(map)
}
