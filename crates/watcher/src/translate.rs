//! Mapping from `notify` events to monitor events
//!
//! A rename inside the hot directory shows up as two events: the vanished old
//! name (`Rename`) and the new name (`Create`).

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind as NotifyKind;

use crate::{EventKind, FileEvent};

/// Translate one backend event into zero or more monitor events
pub fn translate(event: notify::Event) -> Vec<FileEvent> {
    let kind = match event.kind {
        NotifyKind::Create(_) => EventKind::Create,
        NotifyKind::Remove(_) => EventKind::Remove,
        NotifyKind::Modify(ModifyKind::Name(mode)) => return translate_rename(mode, event.paths),
        // Permission and timestamp changes leave the contents alone
        NotifyKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        NotifyKind::Modify(_) => EventKind::Write,
        NotifyKind::Access(_) | NotifyKind::Any | NotifyKind::Other => return Vec::new(),
    };

    event
        .paths
        .into_iter()
        .map(|path| FileEvent::new(path, kind))
        .collect()
}

fn translate_rename(mode: RenameMode, paths: Vec<std::path::PathBuf>) -> Vec<FileEvent> {
    match mode {
        RenameMode::From => paths
            .into_iter()
            .map(|path| FileEvent::new(path, EventKind::Rename))
            .collect(),
        RenameMode::To => paths
            .into_iter()
            .map(|path| FileEvent::new(path, EventKind::Create))
            .collect(),
        // Backends that pair the two halves also report From and To separately
        RenameMode::Both => Vec::new(),
        // Direction unknown (FSEvents): decide by whether the path is still there
        RenameMode::Any | RenameMode::Other => paths
            .into_iter()
            .map(|path| {
                let kind = if path.exists() {
                    EventKind::Create
                } else {
                    EventKind::Rename
                };
                FileEvent::new(path, kind)
            })
            .collect(),
    }
}
