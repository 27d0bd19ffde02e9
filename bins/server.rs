use common::utils::logging::{init_logging, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_tracing() {
    // 提前加载 .env，使得 RUST_LOG / LOG_FORMAT 等环境变量生效
    dotenv().ok();
    init_logging(LogFormat::from_env());
    info!(service = "sso", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_tracing();

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志，便于排查问题
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "sso",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    // config.toml 不存在时退回到默认值 + 环境变量
    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "sso", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    let worker_threads = cfg.server.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "sso", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "sso",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "sso service starting"
    );

    rt.block_on(async move {
        let shutdown = async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(service = "sso", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
            }
        };
        match server::run(cfg, shutdown).await {
            Ok(()) => {
                info!(service = "sso", event = "stop", %service_id, pid, "sso stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "sso", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
