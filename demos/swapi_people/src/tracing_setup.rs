use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

pub fn tracing_init() {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_timer(LocalTimer)
        .with_thread_ids(true)
        .init();
}
