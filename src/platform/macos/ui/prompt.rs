//! Directory chooser shown the first time a file is dropped.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::access::DirectoryPrompt;
use crate::platform::macos::ffi::bridge::{
    directory_nsurl, get_class, id, msg_send, nsstring_id, path_from_nsurl, NSApp, NO, YES,
};

/// NSModalResponseOK
const MODAL_RESPONSE_OK: isize = 1;

/// Asks for a directory with a modal NSOpenPanel. Main thread only.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenPanelPrompt;

impl DirectoryPrompt for OpenPanelPrompt {
    fn choose_directory(&self, default: &Path) -> Option<PathBuf> {
        unsafe {
            let panel: id = msg_send![get_class("NSOpenPanel"), openPanel];
            let _: () = msg_send![panel, setCanChooseDirectories: YES];
            let _: () = msg_send![panel, setCanChooseFiles: NO];
            let _: () = msg_send![panel, setAllowsMultipleSelection: NO];
            let _: () = msg_send![panel, setCanCreateDirectories: YES];
            let _: () = msg_send![
                panel,
                setMessage: nsstring_id("Choose the folder where dropped files are stored")
            ];
            let _: () = msg_send![panel, setPrompt: nsstring_id("Authorize")];
            let _: () = msg_send![panel, setDirectoryURL: directory_nsurl(default)];

            let _: () = msg_send![NSApp(), activateIgnoringOtherApps: YES];
            let response: isize = msg_send![panel, runModal];
            if response != MODAL_RESPONSE_OK {
                info!("Directory prompt dismissed");
                return None;
            }
            let url: id = msg_send![panel, URL];
            path_from_nsurl(url)
        }
    }
}
