//! 会话流程集成测试

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pytutor::adapters::{FactStore, MockGenerator};
    use pytutor::config::AppConfig;
    use pytutor::session::Speaker;
    use pytutor::Router;

    fn router() -> Router {
        Router::new(&AppConfig::default())
    }

    #[tokio::test]
    async fn test_full_learning_conversation() {
        let mut r = router();

        let reply = r.handle("hello").await;
        assert!(reply.contains("Hello"));

        let reply = r.handle("what is a loop").await;
        assert!(reply.contains("loop"));
        assert!(reply.contains("(yes/no)"));
        assert_eq!(r.session().last_topic.as_deref(), Some("loop"));
        assert!(r.session().pending.is_some());

        let reply = r.handle("yes").await;
        assert!(reply.contains("visual example of a loop"));
        assert!(r.session().pending.is_none());

        let reply = r.handle("bye").await;
        assert_eq!(reply, "Goodbye! Happy coding!");
    }

    #[tokio::test]
    async fn test_confirmation_blocks_other_intents_until_resolved() {
        let mut r = router();
        r.handle("what is a dictionary").await;

        // 挂起期间问候与新的主题都不生效
        let reply = r.handle("hello, what is a tuple").await;
        assert_eq!(reply, "Please answer 'yes' or 'no' if you want a visual example.");
        assert_eq!(r.session().pending.as_ref().unwrap().subject, "dictionary");

        let reply = r.handle("no").await;
        assert!(reply.contains("Okay"));
        assert!(r.session().pending.is_none());

        // 解除之后主题查找恢复正常
        let reply = r.handle("what is a tuple").await;
        assert!(reply.contains("tuple"));
    }

    #[tokio::test]
    async fn test_history_is_fifo_bounded() {
        let mut r = router(); // 默认 3 轮 = 6 条
        for i in 0..5 {
            r.handle(&format!("solve: {} + {}", i, i)).await;
        }
        let turns = r.session().turns();
        assert_eq!(turns.len(), 6);
        // 最旧的两轮已淘汰，最新一轮在尾部
        assert!(!turns.iter().any(|t| t.text.contains("0 + 0")));
        assert_eq!(turns[0].speaker, Speaker::User);
        assert!(turns.last().unwrap().text.contains("8"));
    }

    #[tokio::test]
    async fn test_sandbox_and_math_through_router() {
        let mut r = router();

        let reply = r.handle("run code: x = 2 + 2").await;
        assert_eq!(reply, "Code executed. Locals: {x: 4}");

        let reply = r.handle("run code: open('/etc/passwd')").await;
        assert!(reply.starts_with("Error running code:"));

        let reply = r.handle("solve: 2 ^ 10").await;
        assert_eq!(reply, "Math result: 1024");
    }

    #[tokio::test]
    async fn test_store_consulted_after_catalog() {
        let store = FactStore::open_in_memory().unwrap();
        // 与目录键重叠的事实不可见：目录优先
        store.insert_fact("loop", "facts should not shadow the catalog").unwrap();
        store.insert_fact("gil", "the global interpreter lock").unwrap();
        let mut r = router().with_store(store);

        let reply = r.handle("what is a loop").await;
        assert!(reply.contains("A loop repeats code"));
        r.handle("no").await;

        let reply = r.handle("gil").await;
        assert_eq!(reply, "From my database: the global interpreter lock");
    }

    #[tokio::test]
    async fn test_generator_fallback_last() {
        let mut r = router().with_generator(Arc::new(MockGenerator));

        // 目录命中时不触碰生成器
        let reply = r.handle("what is a class").await;
        assert!(reply.contains("blueprint"));
        r.handle("no").await;

        let reply = r.handle("tell me a story about snakes").await;
        assert!(reply.contains("Mock continuation"));
    }
}
