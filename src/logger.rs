use chrono::Utc;
use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Log to stderr so stdout stays clean for the report.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::new();

    builder.format(|formatter, record| {
        writeln!(
            formatter,
            "{} [{}] ({}): {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S %z"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(level) = level {
        builder.filter(None, level);
    } else if let Ok(var) = env::var("RUST_LOG") {
        builder.parse_filters(&var);
    } else {
        builder.filter(None, LevelFilter::Info);
    }

    builder.init();
}
