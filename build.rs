use std::{env, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=native/rawkit_wrapper.h");
    println!("cargo:rerun-if-env-changed=RAWKIT_LIB_DIR");

    if env::var_os("CARGO_FEATURE_LIBRAW").is_none() {
        return;
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let target = env::var("TARGET").unwrap();

    if let Ok(lib_dir) = env::var("RAWKIT_LIB_DIR") {
        println!("cargo:rustc-link-search=native={lib_dir}");
    } else {
        println!("cargo:warning=RAWKIT_LIB_DIR not set, relying on the system library path");
    }

    // Link the LibRaw wrapper and its runtime
    println!("cargo:rustc-link-lib=raw_wrapper");
    println!("cargo:rustc-link-lib=raw");
    println!("cargo:rustc-link-lib=z");
    println!("cargo:rustc-link-lib=m");
    if target.contains("apple") {
        println!("cargo:rustc-link-lib=c++");
    } else {
        println!("cargo:rustc-link-lib=stdc++");
    }

    //
    // ---- Generate wrapper bindings ----
    //
    // The descriptor struct is declared by hand in src/image_pipeline/native/ffi.rs
    // so that the mock and rawloader backends share its layout.
    let bindings = bindgen::Builder::default()
        .header("native/rawkit_wrapper.h")
        .allowlist_function("rawkit_.*")
        .blocklist_type("RawKitImage")
        .raw_line("use super::RawKitImage;")
        .generate()
        .expect("Unable to generate rawkit wrapper bindings");

    let out_path = out_dir.join("rawkit_bindings.rs");
    bindings
        .write_to_file(&out_path)
        .expect("Couldn't write rawkit wrapper bindings!");

    // Read the generated file and add unsafe to extern blocks
    let contents = std::fs::read_to_string(&out_path).unwrap();
    let fixed = contents.replace("extern \"C\" {", "unsafe extern \"C\" {");
    std::fs::write(&out_path, fixed).unwrap();
}
