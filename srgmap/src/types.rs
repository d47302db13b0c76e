/// Progress event emitted by the long-running operations. Callers that
/// don't care pass `|_| {}`.
#[derive(Debug)]
pub struct RenameEvent {
    pub stage: Stage,
    pub progress: StageProgress,
}

#[derive(Debug)]
pub enum Stage {
    LoadingMappings,
    Transcoding,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::LoadingMappings => "Loading Mappings",
            Stage::Transcoding => "Transcoding Jar",
        }
    }
}

impl From<Stage> for RenameEvent {
    fn from(value: Stage) -> Self {
        RenameEvent {
            stage: value,
            progress: StageProgress::Unknown,
        }
    }
}

#[derive(Debug)]
pub enum StageProgress {
    Unknown,
    Percentage(f32),
    Done,
}
