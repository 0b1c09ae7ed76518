use std::path::{Path, PathBuf};

/// Sibling path used for atomic whole-document writes: write the new
/// content here, then rename over the real file.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    if let Some(ext) = path.extension() {
        let mut ext = ext.to_os_string();
        ext.push(".tmp");
        tmp.set_extension(ext);
    } else {
        tmp.set_extension("tmp");
    }
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_path_for() {
        assert_eq!(
            tmp_path_for(Path::new("/media/gallery.json")),
            PathBuf::from("/media/gallery.json.tmp")
        );
        assert_eq!(
            tmp_path_for(Path::new("/media/catalog")),
            PathBuf::from("/media/catalog.tmp")
        );
    }
}
