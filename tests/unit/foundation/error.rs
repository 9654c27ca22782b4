use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(CalibError::format("x").to_string().contains("format error:"));
    assert!(CalibError::config("x").to_string().contains("config error:"));
    assert!(CalibError::scene("x").to_string().contains("scene error:"));
    assert!(
        CalibError::missing_data("x")
            .to_string()
            .contains("missing required data:")
    );
    assert!(
        CalibError::write_status("x")
            .to_string()
            .contains("error saving DNA:")
    );
}

#[test]
fn only_mid_run_failures_are_fatal() {
    assert!(CalibError::missing_data("basis").is_fatal());
    assert!(CalibError::write_status("disk full").is_fatal());
    assert!(!CalibError::format("bad signature").is_fatal());
    assert!(!CalibError::config("bad modifier").is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CalibError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_converts_with_question_mark() {
    fn fails() -> CalibResult<()> {
        Err(std::io::Error::other("disk"))?;
        Ok(())
    }
    assert!(matches!(fails(), Err(CalibError::Io(_))));
}
