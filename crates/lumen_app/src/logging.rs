use crate::builder::AppConfig;

/// wgpu is chatty at `info`; its crates are capped at `warn` unless the
/// configured level is lower still.
const NOISY_TARGETS: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Installs a stderr `fern` dispatcher at the configured level.
///
/// A second call (a logger is already installed) is reported as an error.
pub fn init(config: &AppConfig) -> anyhow::Result<()> {
    let level = config.level_filter()?;
    let start = std::time::Instant::now();

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>9.3}s {:<5} {}] {}",
                start.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level);
    for target in NOISY_TARGETS {
        dispatch = dispatch.level_for(target, level.min(log::LevelFilter::Warn));
    }
    dispatch
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| anyhow::anyhow!("installing logger: {e}"))?;

    log::info!("logging at {level}");
    Ok(())
}
