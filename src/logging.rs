use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Install the global logger. RUST_LOG overrides the default filter.
pub fn init_logger() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("dm_display=info"));
    builder.filter_module("naga", LevelFilter::Warn);
    builder.filter_module("wgpu", LevelFilter::Warn);
    builder.filter_module("wgpu_core", LevelFilter::Warn);
    builder.filter_module("iced_wgpu", LevelFilter::Warn);

    builder.format(|buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(
            buf,
            "{} {style}[{}]{style:#}[{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.module_path().unwrap_or("<unknown>"),
            record.args()
        )
    });

    let _ = builder.try_init();
}
