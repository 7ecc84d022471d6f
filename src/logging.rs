/// Installs the platform logger for the `log` facade.
///
/// Android logs go to logcat, everywhere else `RUST_LOG` controls `env_logger`
/// (default level `info`). Calling this more than once is harmless.
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("use-image-picker"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .is_test(cfg!(test))
            .try_init();
    }
}
