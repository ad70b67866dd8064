// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    sigma_os_lib::logging::init();
    let config = sigma_os_lib::config::load_config().context("failed to load Sigma OS config")?;
    sigma_os_lib::run(config);
    Ok(())
}
