// Build script for hwinfoctl - embeds version at compile time

fn main() {
    // Packagers may override the version, otherwise use Cargo.toml
    let version =
        std::env::var("HWINFO_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=HWINFOCTL_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=HWINFO_VERSION");
}
