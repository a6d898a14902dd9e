//! This build script validates the default configuration file (`default_config.toml`)

use ohno::IntoAppError;
use std::env;
use std::fs;
use std::process;

type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

fn main() {
    match inner_main() {
        Ok(()) => {
            println!("cargo:rerun-if-changed=default_config.toml");
        }
        Err(e) => {
            eprintln!("unable to load default_config.toml: {e}");
            process::exit(1);
        }
    }
}

fn inner_main() -> Result<()> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").into_app_err("CARGO_MANIFEST_DIR should be set during build")?;
    let path = format!("{manifest_dir}/default_config.toml");
    let text = fs::read_to_string(&path).into_app_err_with(|| format!("reading '{path}'"))?;
    let _: toml::Table = toml::from_str(&text).into_app_err("parsing default configuration")?;
    Ok(())
}
