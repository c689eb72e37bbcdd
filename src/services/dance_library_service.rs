use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::Settings;
use crate::models::{Dance, PoseSequence};

/// Dances found in the dance folder, one per sub-folder
#[derive(Debug, Clone, Default)]
pub struct DanceLibrary {
    dances: Vec<Dance>,
}

impl DanceLibrary {
    /// Scan `folder` for dances.
    ///
    /// A sub-folder is a dance when it contains a file named after the
    /// configured pose sequence file. Folders whose sequence cannot be read are
    /// skipped with a warning. Dances are ordered by folder name.
    pub fn load(folder: &Path, settings: &Settings) -> Result<Self> {
        let entries = fs::read_dir(folder)
            .with_context(|| format!("Failed to read dance folder {}", folder.display()))?;

        let mut dance_folders = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read dance folder entry")?;
            if entry.path().is_dir() {
                dance_folders.push(entry.path());
            }
        }
        dance_folders.sort();

        let stem = Path::new(&settings.recording.pose_sequence_filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(settings.recording.pose_sequence_filename.as_str())
            .to_string();

        let mut dances = Vec::new();
        for dance_folder in dance_folders {
            let Some(name) = dance_folder.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let contents = match fs::read_dir(&dance_folder) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", dance_folder.display(), e);
                    continue;
                }
            };

            let sequence_file = contents
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .find(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&stem))
                });

            let Some(sequence_file) = sequence_file else {
                tracing::debug!("Skipping {}: no pose sequence file", dance_folder.display());
                continue;
            };

            match PoseSequence::load_from_json_file(&sequence_file) {
                Ok(sequence) => dances.push(Dance::new(name.to_string(), sequence)),
                Err(e) => {
                    tracing::warn!("Skipping dance {}: {}", name, e);
                }
            }
        }

        tracing::info!("Loaded {} dances from {}", dances.len(), folder.display());
        Ok(Self { dances })
    }

    pub fn dances(&self) -> &[Dance] {
        &self.dances
    }

    pub fn get(&self, index: usize) -> Option<&Dance> {
        self.dances.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Dance> {
        self.dances.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<&Dance> {
        self.dances.iter().find(|dance| dance.name == name)
    }

    pub fn len(&self) -> usize {
        self.dances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dances.is_empty()
    }
}
