// build.rs - lcd5110 build stamp
//
// Generates OUT_DIR/build_info.rs with BUILD_DATE, which the lcd5110 binary
// logs at startup next to its version.

use chrono::Utc;
use std::env;
use std::fs;
use std::path::PathBuf;

const BUILD_INFO: &str = "build_info.rs";

fn main() {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("cargo sets OUT_DIR for build scripts"));

    let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let source = format!("pub const BUILD_DATE: &str = \"{stamp}\";\n");

    fs::write(out_dir.join(BUILD_INFO), source).expect("writing lcd5110 build_info.rs");

    println!("cargo:rerun-if-changed=build.rs");
}
