//! Build script for procscope-core
//!
//! This script checks system requirements before compilation:
//! - Minimum Rust version (Edition 2021 = Rust 1.56.0+)
//! - Target platform (procfs and `process_vm_readv` are Linux-only)
//!
//! ## Requirements
//!
//! - **Rust**: Edition 2021 (Rust 1.56.0 or newer)
//! - **Linux**: 3.2+ (`process_vm_readv`), pagemap frame numbers need `CAP_SYS_ADMIN` since 4.2
//! - **Others**: builds, but `create_inspector` returns `Unsupported`

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    check_rust_version();
    check_target_os();
}

fn check_rust_version()
{
    let min_rust_version = match rustc_version::Version::parse("1.56.0") {
        Ok(version) => version,
        Err(_) => return,
    };

    match rustc_version::version() {
        Ok(rustc_version) if rustc_version < min_rust_version => {
            panic!(
                "procscope-core requires Rust {} or newer (Edition 2021), found {}",
                min_rust_version, rustc_version
            );
        }
        Ok(_) => {}
        // Some build environments hide rustc; just warn
        Err(_) => println!("cargo:warning=could not verify Rust version"),
    }
}

fn check_target_os()
{
    // Use the target, not the host, so cross builds get the right answer
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "linux" {
        println!(
            "cargo:warning=procscope-core targets Linux; on {} only types and classification are available",
            if target_os.is_empty() { "this target" } else { target_os.as_str() }
        );
    }
}
