use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Writers and the sender thread log once per payload; only their warnings
/// are shown unless verbose.
const QUIET_DIRECTIVES: &str = "spectator_client=info,\
spectator_client::core::publisher=warn,\
spectator_client::adapters::memory=warn,\
spectator_client::adapters::udp=warn,\
spectator_client::adapters::uds=warn";

const VERBOSE_DIRECTIVES: &str = "spectator_client=debug,info";

fn env_filter(verbose: bool) -> EnvFilter {
    let directives = if verbose {
        VERBOSE_DIRECTIVES
    } else {
        QUIET_DIRECTIVES
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                // 顯示 spectator-sender 執行緒送出的批次
                .with_thread_names(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON 格式，給由收集器讀取 stdout 的部署環境使用
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
