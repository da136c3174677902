use std::io::Write;
use std::path::Path;

pub fn file_exists<I: AsRef<str>>(path: I) -> bool {
    Path::new(path.as_ref()).exists()
}

/// Creates a directory and all of its parents. Does nothing if it already exists.
pub fn create_dir_all<I: AsRef<str>>(dir: I) -> std::io::Result<()> {
    fs_err::create_dir_all(dir.as_ref())
}

/// Makes sure the directory that'll contain `path` exists.
pub fn create_parent_dir<I: AsRef<str>>(path: I) -> std::io::Result<()> {
    match Path::new(path.as_ref()).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs_err::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Writes the whole string to a file, replacing anything already there.
pub fn write_string<I: AsRef<str>>(path: I, contents: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    let mut file = fs_err::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// "input" and "zones.geojson" become "input/zones.geojson"
pub fn join<I: AsRef<str>>(dir: I, file: &str) -> String {
    let dir = dir.as_ref().trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("input").display().to_string();
        create_dir_all(&dir).unwrap();
        create_dir_all(&dir).unwrap();
        assert!(file_exists(&dir));
    }

    #[test]
    fn write_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/c.txt").display().to_string();
        write_string(&path, "first").unwrap();
        write_string(&path, "second").unwrap();
        assert_eq!(fs_err::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn joining() {
        assert_eq!(join("input", "od.csv"), "input/od.csv");
        assert_eq!(join("input/", "od.csv"), "input/od.csv");
        assert_eq!(join("", "od.csv"), "od.csv");
    }
}
