use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route tracing to the browser console.
        pub fn init() {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default()))
                .init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use once_cell::sync::OnceCell;
        use std::path::{Path, PathBuf};
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Compact stderr logging, filtered by `RUST_LOG` (default `info`).
        ///
        /// Set `FLYCAM_LOG_FILE=path` to also append to a file; handy when the
        /// demo window is covering the terminal.
        pub fn init() {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact();

            let file_layer = std::env::var("FLYCAM_LOG_FILE").ok().map(|path| {
                let path = PathBuf::from(path);
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."))
                    .to_path_buf();
                let name = path
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_else(|| "flycam.log".into());
                let (writer, guard) =
                    tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
                let _ = FILE_GUARD.set(guard);
                fmt::layer().with_writer(writer).with_ansi(false).compact()
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();

            // Panics go through tracing too, so they land in the file when
            // one is configured.
            std::panic::set_hook(Box::new(|info| {
                tracing::error!("{info}");
            }));
        }
    }
}
