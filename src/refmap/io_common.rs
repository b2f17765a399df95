use std::fs::File;
use std::path::Path;

use crate::refmap::*;

/// The file name without its directory, for log messages.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Opens an input file. The handle is dropped by the caller once the file is read.
pub fn open_source(path: &str) -> MapResult<File> {
    info!("Attempting to read {:?}", path);
    File::open(path).context(SourceNotFoundSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("data/regions.csv"), "regions.csv");
        assert_eq!(simplify_file_name("regions.csv"), "regions.csv");
    }

    #[test]
    fn missing_file() {
        let err = open_source("/nonexistent/regions.csv").unwrap_err();
        match err {
            MapError::SourceNotFound { path, .. } => assert_eq!(path, "/nonexistent/regions.csv"),
            e => panic!("unexpected error {:?}", e),
        }
    }
}
