// FlowScope: Reconstruction of Per-Flow Behavior from Network Simulator Traces
// Copyright (C) 2025 The FlowScope Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

const LOG_CONFIG: &str = "log4rs.yml";

/// Initialize logging from `log4rs.yml` in the working directory. Without that file, logs go to
/// stderr through `pretty_env_logger`, configured with `RUST_LOG`.
pub fn init_logging() {
    if Path::new(LOG_CONFIG).exists() {
        match log4rs::init_file(LOG_CONFIG, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("Cannot initialize logging from {LOG_CONFIG}: {e}"),
        }
    }
    if pretty_env_logger::try_init().is_err() {
        eprintln!("Logger already initialized");
    }
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;

    /// Append `.{ext}` to the path, keeping any extension it already has.
    fn suffixed(self, ext: impl AsRef<str>) -> PathBuf;
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }

    fn suffixed(self, ext: impl AsRef<str>) -> PathBuf {
        let mut s: OsString = self.into_os_string();
        s.push(".");
        s.push(ext.as_ref());
        s.into()
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }

    fn suffixed(self, ext: impl AsRef<str>) -> PathBuf {
        self.to_path_buf().suffixed(ext)
    }
}
