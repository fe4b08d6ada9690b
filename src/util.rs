// Copyright (C) 2026 The sboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::path::{Path, PathBuf};

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Appends the given extension to a path that has none. A path that already
/// carries an extension, even a different one, is left alone.
pub fn ensure_extension(path: PathBuf, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(extension)
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use crate::util::{ensure_extension, filename_display};

    #[test]
    fn test_filename_display() {
        assert_eq!("show.ssf", filename_display(Path::new("/tmp/show.ssf")));
        assert_eq!("unreadable file name", filename_display(Path::new("/")));
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(
            PathBuf::from("show.ssf"),
            ensure_extension(PathBuf::from("show"), "ssf")
        );
        assert_eq!(
            PathBuf::from("show.ssf"),
            ensure_extension(PathBuf::from("show.ssf"), "ssf")
        );
        assert_eq!(
            PathBuf::from("show.xml"),
            ensure_extension(PathBuf::from("show.xml"), "ssf")
        );
    }
}
