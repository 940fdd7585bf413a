//! Tests for error handling

use std::io;
use std::path::Path;

use procscope_core::error::{InspectError, InspectResult};

#[test]
fn test_inspect_error_process_not_found()
{
    let error = InspectError::ProcessNotFound(12345);
    let message = format!("{}", error);
    assert!(message.contains("12345"));
    assert!(message.contains("not found"));
}

#[test]
fn test_inspect_error_permission_denied()
{
    let error = InspectError::PermissionDenied("/proc/1/pagemap".to_string());
    assert!(error.to_string().contains("/proc/1/pagemap"));
    assert!(error.is_permission_denied());
}

#[test]
fn test_inspect_error_malformed_record()
{
    let error = InspectError::malformed(7, "bad address range");
    let message = error.to_string();
    assert!(message.contains("line 7"));
    assert!(message.contains("bad address range"));
}

#[test]
fn test_inspect_error_read_failed_shows_address()
{
    let error = InspectError::ReadFailed {
        address: 0x7fff_0000,
        source: io::Error::new(io::ErrorKind::InvalidInput, "bad iovec"),
    };
    assert!(error.to_string().contains("0x000000007fff0000"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_inspect_error_region_limit()
{
    let error = InspectError::RegionLimitExceeded { limit: 2048 };
    assert!(error.to_string().contains("2048"));
}

#[test]
fn test_inspect_error_from_io()
{
    let io_error = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
    let error: InspectError = io_error.into();
    assert!(matches!(error, InspectError::Io(_)));
}

#[test]
fn test_from_open_classifies_errors()
{
    let path = Path::new("/proc/99/maps");

    let gone = InspectError::from_open(99, path, io::Error::from(io::ErrorKind::NotFound));
    assert!(matches!(gone, InspectError::ProcessNotFound(99)));

    let denied = InspectError::from_open(99, path, io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(denied.is_permission_denied());

    let other = InspectError::from_open(99, path, io::Error::other("busy"));
    assert!(matches!(other, InspectError::SourceUnavailable { .. }));
}

#[test]
fn test_result_type()
{
    fn returns_result() -> InspectResult<u32>
    {
        Ok(42)
    }

    fn returns_error() -> InspectResult<u32>
    {
        Err(InspectError::NoRegions(1))
    }

    assert_eq!(returns_result().unwrap(), 42);
    assert!(returns_error().is_err());
}

