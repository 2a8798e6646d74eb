// File: shell.rs
// Location: /src/shell.rs
//
// Window state that does not depend on GTK: the held image, the status line
// and the save flow. The window only forwards widget events here and renders
// the result.

use image::imageops::{self, FilterType};
use image::GrayImage;
use std::path::{Path, PathBuf};

use crate::config::ShellSettings;
use crate::qr::{self, QrEncoder, QrRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Busy,
    Success,
    Warning,
    Error,
}

impl StatusTone {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            StatusTone::Neutral => None,
            StatusTone::Busy => Some("accent"),
            StatusTone::Success => Some("success"),
            StatusTone::Warning => Some("warning"),
            StatusTone::Error => Some("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub tone: StatusTone,
}

impl Status {
    fn new(text: &str, tone: StatusTone) -> Self {
        Self {
            text: text.to_string(),
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub initial_dir: PathBuf,
    pub initial_name: String,
}

pub struct ShellState {
    encoder: QrEncoder,
    settings: ShellSettings,
    image: Option<GrayImage>,
    status: Status,
}

impl ShellState {
    pub fn new(encoder: QrEncoder, settings: ShellSettings) -> Self {
        Self {
            encoder,
            settings,
            image: None,
            status: Status::new("Ready", StatusTone::Success),
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn image(&self) -> Option<&GrayImage> {
        self.image.as_ref()
    }

    pub fn save_enabled(&self) -> bool {
        self.image.is_some()
    }

    pub fn begin_generate(&mut self) {
        self.status = Status::new("Generating…", StatusTone::Busy);
    }

    /// Replaces the held image with the code for the trimmed entry text, scaled
    /// to the preview size. An empty URL leaves the current image alone; an
    /// encoding failure drops it.
    pub fn generate(&mut self, url: &str) -> &Status {
        let request = match QrRequest::new(url.trim(), None) {
            Ok(request) => request,
            Err(_) => {
                self.status = Status::new("Enter a URL", StatusTone::Error);
                return &self.status;
            }
        };

        match self.encoder.encode(&request) {
            Ok(image) => {
                log::info!("Generated QR code for {}", request.url);
                let size = self.settings.preview_size.max(1) as u32;
                self.image = Some(imageops::resize(&image, size, size, FilterType::Nearest));
                self.status = Status::new("Generated", StatusTone::Success);
            }
            Err(e) => {
                log::error!("Failed to generate QR code: {}", e);
                self.image = None;
                self.status = Status::new("Generate failed", StatusTone::Error);
            }
        }

        &self.status
    }

    pub fn save_target(&mut self, initial_dir: PathBuf) -> Option<SaveTarget> {
        if self.image.is_none() {
            self.status = Status::new("Nothing to save", StatusTone::Error);
            return None;
        }

        self.status = Status::new("Save…", StatusTone::Busy);
        Some(SaveTarget {
            initial_dir,
            initial_name: self.settings.default_file_name.clone(),
        })
    }

    /// Completes a save started with [`ShellState::save_target`]. `None` means the
    /// dialog was dismissed. Returns the written path on success.
    pub fn finish_save(&mut self, choice: Option<PathBuf>) -> Option<PathBuf> {
        let Some(chosen) = choice else {
            log::info!("Save cancelled");
            self.status = Status::new("Cancelled", StatusTone::Warning);
            return None;
        };

        let Some(image) = self.image.as_ref() else {
            self.status = Status::new("Nothing to save", StatusTone::Error);
            return None;
        };

        let path = qr::ensure_png_extension(&chosen);
        match qr::save_image(image, &path) {
            Ok(()) => {
                self.status = Status::new("Saved", StatusTone::Success);
                Some(path)
            }
            Err(e) => {
                log::error!("Save error: {}", e);
                self.status = Status::new("Save failed", StatusTone::Error);
                None
            }
        }
    }

    pub fn fail_save(&mut self, reason: &str) {
        log::error!("Save error: {}", reason);
        self.status = Status::new("Save failed", StatusTone::Error);
    }
}

pub fn default_save_dir() -> PathBuf {
    let desktop = glib::user_special_dir(glib::UserDirectory::Desktop)
        .unwrap_or_else(|| glib::home_dir().join("Desktop"));
    pick_save_dir(Some(&desktop), glib::home_dir())
}

pub fn pick_save_dir(desktop: Option<&Path>, home: PathBuf) -> PathBuf {
    match desktop {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        _ => home,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> ShellState {
        ShellState::new(QrEncoder::default(), ShellSettings::default())
    }

    #[test]
    fn test_starts_idle() {
        let state = shell();
        assert!(!state.save_enabled());
        assert_eq!(state.status().text, "Ready");
    }

    #[test]
    fn test_empty_url_stays_idle() {
        let mut state = shell();
        let status = state.generate("  ").clone();
        assert_eq!(status.text, "Enter a URL");
        assert_eq!(status.tone, StatusTone::Error);
        assert!(!state.save_enabled());
    }

    #[test]
    fn test_begin_generate_is_busy() {
        let mut state = shell();
        state.begin_generate();
        assert_eq!(state.status().text, "Generating…");
        assert_eq!(state.status().tone, StatusTone::Busy);
        assert!(!state.save_enabled());
    }

    #[test]
    fn test_generate_trims_entry_text() {
        let mut padded = shell();
        let mut bare = shell();
        padded.generate("  https://example.com  ");
        bare.generate("https://example.com");
        assert_eq!(padded.image(), bare.image());
    }

    #[test]
    fn test_saved_image_has_preview_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = shell();
        state.generate(&"https://example.com/".repeat(5));

        let written = state.finish_save(Some(dir.path().join("code.png"))).unwrap();
        let saved = image::open(&written).unwrap();
        assert_eq!(saved.width(), 280);
        assert_eq!(saved.height(), 280);
    }

    #[test]
    fn test_generate_enables_save() {
        let mut state = shell();
        state.generate("https://example.com");
        assert!(state.save_enabled());
        assert_eq!(state.status().tone, StatusTone::Success);
    }

    #[test]
    fn test_empty_url_keeps_previous_image() {
        let mut state = shell();
        state.generate("https://example.com");
        let before = state.image().cloned();

        state.generate("");
        assert_eq!(state.image().cloned(), before);
        assert_eq!(state.status().tone, StatusTone::Error);
    }

    #[test]
    fn test_regenerate_replaces_image() {
        let mut state = shell();
        state.generate("hi");
        let first = state.image().cloned().unwrap();

        state.generate(&"https://example.com/".repeat(5));
        assert_ne!(state.image().unwrap(), &first);
    }

    #[test]
    fn test_failed_generate_clears_image() {
        let mut state = shell();
        state.generate("https://example.com");
        state.generate(&"x".repeat(5000));
        assert!(!state.save_enabled());
        assert_eq!(state.status().text, "Generate failed");
    }

    #[test]
    fn test_save_without_image() {
        let mut state = shell();
        assert!(state.save_target(PathBuf::from("/tmp")).is_none());
        assert_eq!(state.status().text, "Nothing to save");
    }

    #[test]
    fn test_cancelled_save_keeps_image() {
        let mut state = shell();
        state.generate("https://example.com");
        let before = state.image().cloned();

        let target = state.save_target(PathBuf::from("/tmp")).unwrap();
        assert_eq!(target.initial_name, "qr_code.png");
        assert_eq!(state.finish_save(None), None);

        assert_eq!(state.status().text, "Cancelled");
        assert!(state.save_enabled());
        assert_eq!(state.image().cloned(), before);
    }

    #[test]
    fn test_save_appends_png_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = shell();
        state.generate("https://example.com");
        state.save_target(dir.path().to_path_buf());

        let written = state.finish_save(Some(dir.path().join("code"))).unwrap();
        assert_eq!(written, dir.path().join("code.png"));
        assert!(std::fs::metadata(&written).unwrap().len() > 0);
        assert_eq!(state.status().text, "Saved");
    }

    #[test]
    fn test_failed_save_keeps_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = shell();
        state.generate("https://example.com");

        let missing = dir.path().join("missing/code.png");
        assert_eq!(state.finish_save(Some(missing)), None);
        assert_eq!(state.status().text, "Save failed");
        assert!(state.save_enabled());

        // Retry succeeds with the same image.
        assert!(state.finish_save(Some(dir.path().join("code.png"))).is_some());
    }

    #[test]
    fn test_pick_save_dir() {
        let dir = tempfile::tempdir().unwrap();
        let home = PathBuf::from("/home/someone");

        assert_eq!(pick_save_dir(Some(dir.path()), home.clone()), dir.path());
        assert_eq!(
            pick_save_dir(Some(&dir.path().join("Desktop")), home.clone()),
            home
        );
        assert_eq!(pick_save_dir(None, home.clone()), home);
    }
}
