pub mod ask;
pub mod completions;
pub mod config;
pub mod render;
pub mod run;

/// Current-thread runtime: the timer loop and its platform handles are not `Send`.
pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
