// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Box list files — JSON written by an external detector or by hand.
//
// A file holds either one `BoxList` object or an array of them:
//
// ```json
// {"source": "text", "boxes": [[10, 10, 50, 50], {"x1": 0, "y1": 0, "x2": 5, "y2": 5}]}
// ```

use std::path::Path;

use geoveil_core::{BoxList, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum BoxFile {
    Many(Vec<BoxList>),
    One(BoxList),
}

impl From<BoxFile> for Vec<BoxList> {
    fn from(file: BoxFile) -> Self {
        match file {
            BoxFile::Many(lists) => lists,
            BoxFile::One(list) => vec![list],
        }
    }
}

/// Parse box lists from JSON text.
pub fn parse_box_lists(json: &str) -> Result<Vec<BoxList>> {
    let file: BoxFile = serde_json::from_str(json)?;
    Ok(file.into())
}

/// Read box lists from a file.
pub fn read_box_lists(path: &Path) -> Result<Vec<BoxList>> {
    let data = std::fs::read_to_string(path)?;
    let lists = parse_box_lists(&data)?;
    debug!(
        path = %path.display(),
        lists = lists.len(),
        boxes = lists.iter().map(BoxList::len).sum::<usize>(),
        "Box file read"
    );
    Ok(lists)
}

/// Read and concatenate every file, in order.
pub fn read_all(paths: &[impl AsRef<Path>]) -> Result<Vec<BoxList>> {
    let mut lists = Vec::new();
    for path in paths {
        lists.extend(read_box_lists(path.as_ref())?);
    }
    Ok(lists)
}
