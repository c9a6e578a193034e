use std::fs;
use std::io;
use std::path::Path;

use crate::config::CompareMode;
use crate::error_log::{HarnessError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Skipped,
}

/// Nothing is read when the expected file is absent. An expected file that
/// cannot even be looked up is a comparison error, not a skip.
pub fn compare(mode: CompareMode, expected: &Path, actual: &Path) -> Result<Verdict> {
    match fs::metadata(expected) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Verdict::Skipped),
        Err(source) => {
            return Err(HarnessError::Compare {
                path: expected.to_path_buf(),
                source,
            })
        }
    }
    let same = match mode {
        CompareMode::Standard => diff_standard(expected, actual)?,
        CompareMode::Strict => diff_strict(expected, actual)?,
    };
    Ok(if same { Verdict::Pass } else { Verdict::Fail })
}

// Return true if the two files hold the same lines, ignoring a trailing '\r' on each
pub fn diff_standard(expected: &Path, actual: &Path) -> Result<bool> {
    let expected = read(expected)?;
    let actual = read(actual)?;
    Ok(same_lines(&expected, &actual))
}

// Return true if the two files are byte-identical
pub fn diff_strict(expected: &Path, actual: &Path) -> Result<bool> {
    // file_diff treats any read failure as "different"; only regular files get that far
    let mut expected = open_regular(expected)?;
    let mut actual = open_regular(actual)?;
    Ok(file_diff::diff_files(&mut expected, &mut actual))
}

pub fn same_lines(expected: &[u8], actual: &[u8]) -> bool {
    let mut expected = expected.split(|b| *b == b'\n').map(strip_cr);
    let mut actual = actual.split(|b| *b == b'\n').map(strip_cr);
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(e), Some(a)) if e == a => continue,
            _ => return false,
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| HarnessError::Compare {
        path: path.to_path_buf(),
        source,
    })
}

fn open_regular(path: &Path) -> Result<fs::File> {
    let compare_error = |source| HarnessError::Compare {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::open(path).map_err(compare_error)?;
    if !file.metadata().map_err(compare_error)?.is_file() {
        return Err(compare_error(io::Error::new(
            io::ErrorKind::Other,
            "not a regular file",
        )));
    }
    Ok(file)
}
