use std::ffi::OsStr;

pub fn file_ext(path: impl AsRef<OsStr>) -> Option<String> {
    std::path::Path::new(path.as_ref())
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ext() {
        assert_eq!(file_ext("sampul.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_ext("arsip.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_ext("tanpa-ekstensi"), None);
    }
}
