fn main() {
    // The hook mechanism is a property of the target's object format and
    // loader, so it is resolved here and never at runtime.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_vendor = std::env::var("CARGO_CFG_TARGET_VENDOR").unwrap_or_default();

    println!("cargo:rerun-if-changed=build.rs");
    println!(
        "cargo:rustc-check-cfg=cfg(embedres_hooks, values(\"init_array\", \"mod_init_func\", \"crt_xcu\", \"unsupported\"))"
    );

    let strategy = select_strategy(&target_os, &target_vendor);
    println!("cargo:rustc-cfg=embedres_hooks=\"{strategy}\"");

    if strategy == "unsupported" {
        println!(
            "cargo:warning=embedres: no load/unload hook mechanism for target_os={target_os}; \
             embedded bundles will not register themselves. Call StaticResource::register() \
             explicitly from the code that owns the module lifetime."
        );
    }
}

fn select_strategy(target_os: &str, target_vendor: &str) -> &'static str {
    const ELF_OSES: &[&str] = &[
        "linux", "android", "freebsd", "netbsd", "openbsd", "dragonfly", "illumos", "solaris",
        "fuchsia", "haiku", "hurd", "nto", "redox",
    ];

    if target_vendor == "apple" {
        "mod_init_func"
    } else if target_os == "windows" {
        "crt_xcu"
    } else if ELF_OSES.contains(&target_os) {
        "init_array"
    } else {
        "unsupported"
    }
}
