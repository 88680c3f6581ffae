//! Conformance suite: one fixture file per literal end-to-end scenario in
//! section 8, each checked against its scenario-specific properties rather
//! than a byte-exact golden diff (formatting isn't promised byte-for-byte).

use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use webclv::{Error, SourceManager};

mod test_utils;

fn main() {
    let mut args = Arguments::from_args();
    test_utils::cap_threads(&mut args);

    let trials = vec![
        Trial::test("empty_kernel", || run_ok("01_empty_kernel.cl", |out| {
            expect(out.starts_with("// WebCL Validator: validation stage.\n"), "banner is the first line")?;
            expect(!out.contains("wcl_private_record"), "no address-space record for an empty kernel")?;
            expect(out.contains("WCL_PTR_CHECKER"), "fixed macros are always present")?;
            Ok(())
        })),
        Trial::test("global_pointer_write", || run_ok("02_global_pointer_write.cl", |out| {
            expect(out.contains("wcl_a_size"), "kernel pointer parameter gains an adjacent size parameter")?;
            expect(out.contains('%'), "kernel-parameter subscript is clamped with a modulus")?;
            expect(!out.contains("wcl_global_record"), "no addressable globals in this fixture")?;
            Ok(())
        })),
        Trial::test("addressable_private", || run_ok("03_addressable_private.cl", |out| {
            expect(out.contains("struct wcl_private_record"), "x is relocated into the private record")?;
            expect(out.contains(".wcl_x = 7"), "x keeps its constant initializer")?;
            expect(out.contains("&wcl_privates.wcl_x"), "&x is rewritten to the record field's address")?;
            expect(out.contains("wcl_private_int_ptr"), "*p is rewritten through the pointer checker")?;
            expect(out.contains("WCL_PTR_CHECKER(private, int)"), "exactly the needed checker is instantiated")?;
            Ok(())
        })),
        Trial::test("constant_bounded_subscript", || run_ok("04_constant_bounded_subscript.cl", |out| {
            expect(out.contains("% 4"), "constant-extent subscript clamps by the declared extent")?;
            expect(out.contains("struct wcl_private_record"), "the fixed-extent array joins the private record")?;
            Ok(())
        })),
        Trial::test("unsupported_builtin_is_fatal", || {
            let err = run_validate("05_unsupported_builtin.cl", false).unwrap_err();
            match err {
                Error::Diagnostics(message) if message.contains("unsupported builtin") => Ok(()),
                other => Err(Failed::from(format!("expected an unsupported-builtin diagnostic, got {other:?}"))),
            }
        }),
        Trial::test("non_opencl_kind_is_fatal", || {
            let err = run_validate("06_non_opencl_kind.c", false).unwrap_err();
            match err {
                Error::Diagnostics(message) if message.contains("isn't treated as OpenCL code") => Ok(()),
                other => Err(Failed::from(format!("expected a non-OpenCL-kind diagnostic, got {other:?}"))),
            }
        }),
    ];

    libtest_mimic::run(&args, trials).exit();
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_validate(fixture: &str, force_opencl: bool) -> Result<String, Error> {
    let mut sources = SourceManager::new();
    let path = fixtures_dir().join(fixture);
    let text = std::fs::read_to_string(&path).map_err(Error::Io)?;
    let file = sources.add_text(path, text, force_opencl);
    webclv::Driver::with_defaults().run(&sources, file)
}

fn run_ok(fixture: &str, check: impl FnOnce(&str) -> Result<(), Failed>) -> Result<(), Failed> {
    let output = run_validate(fixture, true).map_err(|e| Failed::from(e.to_string()))?;
    check(&output)
}

fn expect(condition: bool, message: &str) -> Result<(), Failed> {
    if condition {
        Ok(())
    } else {
        Err(Failed::from(message.to_string()))
    }
}
