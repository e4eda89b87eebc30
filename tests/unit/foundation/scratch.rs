use super::*;

#[test]
fn temp_paths_are_unique() {
    let a = unique_temp_path("storyreel_audio", "f32le");
    let b = unique_temp_path("storyreel_audio", "f32le");
    assert_ne!(a, b);
    assert_eq!(a.extension().unwrap(), "f32le");
}

#[test]
fn partial_path_is_a_hidden_sibling() {
    let p = partial_path_for(Path::new("out/dir/final.mp4"));
    assert_eq!(p.parent().unwrap(), Path::new("out/dir"));
    let name = p.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(".final.mp4."));
    assert!(name.ends_with(".partial"));

    let bare = partial_path_for(Path::new("final.mp4"));
    assert_eq!(bare.parent(), Some(Path::new("")));
}

#[test]
fn guard_removes_file_unless_kept() {
    let dir = tempfile::tempdir().unwrap();
    let dropped = dir.path().join("a.tmp");
    std::fs::write(&dropped, b"x").unwrap();
    drop(TempFileGuard::new(dropped.clone()));
    assert!(!dropped.exists());

    let kept = dir.path().join("b.tmp");
    std::fs::write(&kept, b"x").unwrap();
    let mut guard = TempFileGuard::new(kept.clone());
    assert_eq!(guard.path(), Some(kept.as_path()));
    assert_eq!(guard.keep(), Some(kept.clone()));
    drop(guard);
    assert!(kept.exists());
}
