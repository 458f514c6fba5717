//! PyTutor - Python 学习助手
//!
//! 入口：初始化日志、加载配置、构建 Router，运行行式 REPL。
//! 表示层职责（输入长度上限、回显）都在这里，Router 不做任何 I/O。

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use pytutor::adapters::{FactStore, OpenAiGenerator};
use pytutor::config::load_config;
use pytutor::Router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pytutor::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let mut router = Router::new(&cfg);

    if cfg.generation.enabled {
        router = router.with_generator(Arc::new(OpenAiGenerator::new(
            cfg.generation.base_url.as_deref(),
            &cfg.generation.model,
            None,
        )));
    }
    if let Some(path) = &cfg.store.path {
        match FactStore::open(path) {
            Ok(store) => router = router.with_store(store),
            Err(e) => tracing::warn!(error = %e, "fact store disabled"),
        }
    }

    println!("Hello! Ask me about Python basics, or try 'search wikipedia for <topic>'.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        // 输入上限在表示层强制，超长不进 Router
        if input.chars().count() > cfg.app.max_input_chars {
            println!(
                "Error - Message too long! Keep it under {} chars.",
                cfg.app.max_input_chars
            );
            continue;
        }
        let reply = router.handle(input).await;
        println!("{}", reply);
    }

    Ok(())
}
