fn main() {
    // Release builds stamp STEW_VERSION (e.g. from a git tag) into --version and the User-Agent
    if let Ok(version) = std::env::var("STEW_VERSION") {
        let version = version.trim_start_matches('v');
        println!("cargo:rustc-env=CARGO_PKG_VERSION={version}");
    }
    println!("cargo:rerun-if-env-changed=STEW_VERSION");
}
