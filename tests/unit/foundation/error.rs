use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::timing("x").to_string().contains("timing error:"));
    assert!(
        ReelError::backend("x")
            .to_string()
            .contains("render backend error:")
    );
    assert_eq!(ReelError::Cancelled.to_string(), "render cancelled");
}

#[test]
fn path_carrying_variants_name_the_path() {
    let err = ReelError::input("assets/bg.mp4", "file not found");
    assert!(err.to_string().contains("assets/bg.mp4"));
    assert_eq!(err.kind(), ErrorKind::InputResolution);

    let err = ReelError::resource("/ro/out.mp4", "permission denied");
    assert!(err.to_string().contains("/ro/out.mp4"));
    assert_eq!(err.kind(), ErrorKind::Resource);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
