//! In-process host: clones the wallpaper repository, moves its files into
//! the library folder and applies wallpapers.

use super::{Backend, EventSink};
use crate::config::RwallConfig;
use crate::desktop::get_wallpaper_manager;
use crate::protocol::{Command, Dispatch, Envelope, Event, RequestId};
use crate::utils::list_images;
use crate::{Error, Result};
use std::fs::{copy, create_dir_all, remove_dir_all};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{self, Stdio};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct NativeBackend {
    repository: String,
    library: PathBuf,
    staging: PathBuf,
}

impl NativeBackend {
    pub fn new(config: &RwallConfig) -> Self {
        Self::with_folders(
            config.repository.clone(),
            config.library_folder.clone(),
            config.staging_folder.clone(),
        )
    }

    pub fn with_folders(
        repository: impl Into<String>,
        library: impl Into<PathBuf>,
        staging: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository: repository.into(),
            library: library.into(),
            staging: staging.into(),
        }
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    fn load(&self, id: RequestId, events: &mut dyn EventSink) -> Result<()> {
        let existing = list_images(&self.library);
        if !existing.is_empty() {
            log::info!("Library already holds {} images", existing.len());
            events.emit(Envelope::reply(id, Event::ImagesLoaded(existing)));
            return Ok(());
        }

        let fetched = self.fetch(id, events);
        if let Err(e) = &fetched {
            log::error!("Fetching {} failed: {e}", self.repository);
        }
        // Always report the library so the front end can settle.
        events.emit(Envelope::reply(
            id,
            Event::ImagesLoaded(list_images(&self.library)),
        ));
        fetched
    }

    fn fetch(&self, id: RequestId, events: &mut dyn EventSink) -> Result<()> {
        if self.staging.exists() {
            remove_dir_all(&self.staging)?;
        }

        let mut last_percent = None;
        clone_repository(&self.repository, &self.staging, |percent| {
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                events.emit(Envelope::reply(
                    id,
                    Event::CloneProgress(percent.to_string()),
                ));
            }
        })?;
        events.emit(Envelope::reply(id, Event::RepoCloned));

        let moved = move_images(&self.staging, &self.library, |percent| {
            events.emit(Envelope::reply(id, Event::MoveProgress(percent.to_string())));
        })?;
        log::info!("Moved {moved} files into {}", self.library.display());
        events.emit(Envelope::reply(id, Event::ImagesMoved));

        remove_dir_all(&self.staging)?;
        Ok(())
    }

    fn set_wallpaper(&self, image: &str) -> Result<()> {
        let path = decode_identifier(image)?;
        let manager = get_wallpaper_manager()?;
        log::info!("Setting wallpaper to {} via {}", path.display(), manager.name());
        manager.set_wallpaper(&path)
    }

    fn erase(&self) -> Result<()> {
        if self.library.exists() {
            remove_dir_all(&self.library)?;
            log::info!("Removed {}", self.library.display());
        }
        Ok(())
    }
}

impl Backend for NativeBackend {
    fn execute(&self, dispatch: Dispatch, events: &mut dyn EventSink) -> Result<()> {
        log::debug!("Executing {} {}", dispatch.command.name(), dispatch.id);
        match dispatch.command {
            Command::Load => self.load(dispatch.id, events),
            Command::Set { image } => self.set_wallpaper(&image),
            Command::Erase => self.erase(),
        }
    }
}

/// Percent-decodes an identifier sent back by the front end.
pub fn decode_identifier(image: &str) -> Result<PathBuf> {
    urlencoding::decode(image)
        .map(|decoded| PathBuf::from(decoded.into_owned()))
        .map_err(|e| Error::Backend(format!("Invalid image identifier {image}: {e}")))
}

/// Runs `git clone --progress`, reporting the "Receiving objects" percentage.
pub fn clone_repository(url: &str, dest: &Path, mut on_progress: impl FnMut(u32)) -> Result<()> {
    let mut child = process::Command::new("git")
        .args(["clone", "--progress", url])
        .arg(dest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Backend("git stderr was not captured".to_string()))?;
    let mut reader = BufReader::new(stderr);
    let mut chunk = Vec::new();

    // git redraws its progress line with carriage returns.
    loop {
        chunk.clear();
        if reader.read_until(b'\r', &mut chunk)? == 0 {
            break;
        }
        for line in String::from_utf8_lossy(&chunk).split('\n') {
            if let Some(percent) = parse_clone_progress(line) {
                on_progress(percent);
            }
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::Backend(format!("git clone {url} exited with {status}")));
    }
    log::info!("Clone completed: {}", dest.display());
    Ok(())
}

fn parse_clone_progress(line: &str) -> Option<u32> {
    let rest = line.trim().strip_prefix("Receiving objects:")?;
    let (percent, _) = rest.split_once('%')?;
    percent.trim().parse().ok()
}

/// Copies every file under `staging` (outside `.git`) flat into a fresh
/// `library`. Returns how many files were copied.
pub fn move_images(
    staging: &Path,
    library: &Path,
    mut on_progress: impl FnMut(usize),
) -> Result<usize> {
    if library.exists() {
        remove_dir_all(library)?;
    }
    create_dir_all(library)?;

    let files: Vec<PathBuf> = WalkDir::new(staging)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    let total = files.len();
    for (index, file) in files.iter().enumerate() {
        if let Some(name) = file.file_name() {
            log::debug!("File: {}", file.display());
            copy(file, library.join(name))?;
        }
        on_progress((index + 1) * 100 / total);
    }

    Ok(total)
}
