//! File picker for choosing the track to play.
//!
//! A modal directory browser filtered to WAV files. Directories can be
//! entered to navigate; choosing a file ends the picker with that path, and
//! cancelling ends it with nothing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::SUPPORTED_AUDIO_EXTENSIONS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEntry {
    Parent,
    Directory(String),
    File(String),
}

impl PickerEntry {
    pub fn name(&self) -> &str {
        match self {
            PickerEntry::Parent => "..",
            PickerEntry::Directory(name) | PickerEntry::File(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(PathBuf),
    Cancelled,
}

pub struct FilePicker {
    pub current_path: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub selected_index: usize,
}

impl FilePicker {
    pub fn new(initial_path: &Path) -> Self {
        let current_path =
            fs::canonicalize(initial_path).unwrap_or_else(|_| initial_path.to_path_buf());
        let mut picker = Self {
            current_path,
            entries: Vec::new(),
            selected_index: 0,
        };
        picker.refresh_entries();
        picker
    }

    pub fn refresh_entries(&mut self) {
        let mut directories = Vec::new();
        let mut files = Vec::new();

        match fs::read_dir(&self.current_path) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                        continue;
                    };
                    // Skip hidden entries
                    if name.starts_with('.') {
                        continue;
                    }
                    let path = entry.path();
                    if path.is_dir() {
                        directories.push(name);
                    } else if is_supported_audio_file(&path) {
                        files.push(name);
                    }
                }
            }
            Err(e) => log::warn!("Could not read directory {:?}: {e}", self.current_path),
        }

        directories.sort();
        files.sort();

        self.entries.clear();
        if self.current_path.parent().is_some() {
            self.entries.push(PickerEntry::Parent);
        }
        self.entries
            .extend(directories.into_iter().map(PickerEntry::Directory));
        self.entries.extend(files.into_iter().map(PickerEntry::File));

        self.selected_index = 0;
    }

    pub fn navigate_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn navigate_down(&mut self) {
        if self.selected_index < self.entries.len().saturating_sub(1) {
            self.selected_index += 1;
        }
    }

    pub fn go_to_parent(&mut self) {
        if let Some(parent) = self.current_path.parent() {
            self.current_path = parent.to_path_buf();
            self.refresh_entries();
        }
    }

    /// Enter the selected directory, or finish with the selected file.
    pub fn activate(&mut self) -> Option<PickerOutcome> {
        match self.entries.get(self.selected_index)?.clone() {
            PickerEntry::Parent => {
                self.go_to_parent();
                None
            }
            PickerEntry::Directory(name) => {
                self.current_path = self.current_path.join(name);
                self.refresh_entries();
                None
            }
            PickerEntry::File(name) => Some(PickerOutcome::Selected(self.current_path.join(name))),
        }
    }
}

fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("beats")).unwrap();
        fs::create_dir(temp_dir.path().join(".cache")).unwrap();
        fs::write(temp_dir.path().join("b.wav"), b"fake").unwrap();
        fs::write(temp_dir.path().join("a.WAV"), b"fake").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"text").unwrap();
        fs::write(temp_dir.path().join("song.mp3"), b"fake").unwrap();
        fs::write(temp_dir.path().join(".hidden.wav"), b"fake").unwrap();
        fs::write(temp_dir.path().join("beats").join("kick.wav"), b"fake").unwrap();
        temp_dir
    }

    #[test]
    fn test_is_supported_audio_file() {
        assert!(is_supported_audio_file(Path::new("test.wav")));
        assert!(is_supported_audio_file(Path::new("test.WAV")));
        assert!(!is_supported_audio_file(Path::new("test.flac")));
        assert!(!is_supported_audio_file(Path::new("test.mp3")));
        assert!(!is_supported_audio_file(Path::new("test")));
    }

    #[test]
    fn test_entries_filtered_and_ordered() {
        let temp_dir = populated_dir();
        let picker = FilePicker::new(temp_dir.path());

        assert_eq!(
            picker.entries,
            vec![
                PickerEntry::Parent,
                PickerEntry::Directory("beats".to_string()),
                PickerEntry::File("a.WAV".to_string()),
                PickerEntry::File("b.wav".to_string()),
            ]
        );
    }

    #[test]
    fn test_navigation_is_bounded() {
        let temp_dir = populated_dir();
        let mut picker = FilePicker::new(temp_dir.path());

        picker.navigate_up();
        assert_eq!(picker.selected_index, 0);

        for _ in 0..10 {
            picker.navigate_down();
        }
        assert_eq!(picker.selected_index, 3);
    }

    #[test]
    fn test_activate_enters_directory_and_selects_file() {
        let temp_dir = populated_dir();
        let mut picker = FilePicker::new(temp_dir.path());

        picker.navigate_down();
        assert_eq!(picker.activate(), None);
        assert!(picker.current_path.ends_with("beats"));
        assert_eq!(
            picker.entries,
            vec![PickerEntry::Parent, PickerEntry::File("kick.wav".to_string())]
        );

        picker.navigate_down();
        match picker.activate() {
            Some(PickerOutcome::Selected(path)) => assert!(path.ends_with("beats/kick.wav")),
            other => panic!("expected a selection, got {other:?}"),
        }
    }

    #[test]
    fn test_parent_entry_goes_up() {
        let temp_dir = populated_dir();
        let mut picker = FilePicker::new(&temp_dir.path().join("beats"));

        assert_eq!(picker.activate(), None);
        assert_eq!(
            picker.current_path,
            fs::canonicalize(temp_dir.path()).unwrap()
        );
    }
}
