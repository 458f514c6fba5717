//! 意图路由器
//!
//! (utterance, SessionState) → (reply, 新 SessionState) 的确定性全函数。
//! 规则按固定优先级逐条尝试，首个命中者生效；适配器失败一律转为用户可见文本，
//! 任何错误都不会越过 handle 边界。
//!
//! 优先级（勿调整顺序，接口契约）：
//! 1. 待确认槽位（yes / no / 重问）
//! 2. 问候
//! 3. 外部检索命令（search wikipedia for / search python docs for）
//! 4. 主题目录查找（设置 last_topic 与待确认槽位）
//! 5. run code: 沙箱执行
//! 6. solve: 显式求解（失败上报）；否则含运算符时启发式求解（失败吞掉、继续后续规则）
//! 7. explain again 上下文追问
//! 8. 告别
//! 9. 事实 / 代码示例库
//! 10. 生成式 fallback（不可用时固定帮助文案）

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    ExprSolver, FactStore, FetchError, Generator, MathSolver, PythonDocsSource, ReferenceSource,
    WikipediaSource,
};
use crate::catalog::TopicCatalog;
use crate::config::AppConfig;
use crate::sandbox::SandboxExecutor;
use crate::session::{Pending, PendingKind, SessionState};

const GREETING_TOKENS: &[&str] = &["hello", "hi", "hey"];
const FAREWELL_TOKENS: &[&str] = &["bye", "goodbye", "see you"];
const WIKI_PREFIX: &str = "search wikipedia for";
const DOCS_PREFIX: &str = "search python docs for";
const RUN_PREFIX: &str = "run code:";
const SOLVE_PREFIX: &str = "solve:";
/// 启发式数学检测的运算符字符
const MATH_OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '^'];

const GREETING_REPLY: &str = "Hello! How can I help you learn Python today?";
const FAREWELL_REPLY: &str = "Goodbye! Happy coding!";
const VISUAL_PROMPT: &str = "\nWould you like a visual example? (yes/no)";
const VISUAL_DECLINED: &str = "Okay, let me know if you want a visual example later.";
const VISUAL_REPROMPT: &str = "Please answer 'yes' or 'no' if you want a visual example.";
const EMPTY_INPUT_REPLY: &str = "Please enter a message.";

/// 路由器：独占持有一个会话的状态
pub struct Router {
    catalog: TopicCatalog,
    session: SessionState,
    sandbox: SandboxExecutor,
    math: Arc<dyn MathSolver>,
    wikipedia: Arc<dyn ReferenceSource>,
    python_docs: Arc<dyn ReferenceSource>,
    generator: Option<Arc<dyn Generator>>,
    store: Option<FactStore>,
    reference_timeout: Duration,
    generation_timeout: Duration,
    generation_max_length: u32,
}

impl Router {
    pub fn new(cfg: &AppConfig) -> Self {
        let limits = cfg.sandbox.limits();
        Self {
            catalog: TopicCatalog::new(),
            session: SessionState::new(cfg.app.max_history_exchanges),
            sandbox: SandboxExecutor::new(limits.clone()),
            math: Arc::new(ExprSolver::new(limits)),
            wikipedia: Arc::new(WikipediaSource::new(
                cfg.reference.timeout_secs,
                cfg.reference.max_summary_chars,
            )),
            python_docs: Arc::new(PythonDocsSource::new(
                cfg.reference.timeout_secs,
                cfg.reference.max_summary_chars,
            )),
            generator: None,
            store: None,
            // 外层兜底超时：比客户端自身超时略宽
            reference_timeout: Duration::from_secs(cfg.reference.timeout_secs + 1),
            generation_timeout: Duration::from_secs(cfg.generation.request_timeout_secs + 1),
            generation_max_length: cfg.generation.max_length,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_store(mut self, store: FactStore) -> Self {
        self.store = Some(store);
        self
    }

    /// 替换检索源（测试注入用）
    pub fn with_sources(
        mut self,
        wikipedia: Arc<dyn ReferenceSource>,
        python_docs: Arc<dyn ReferenceSource>,
    ) -> Self {
        self.wikipedia = wikipedia;
        self.python_docs = python_docs;
        self
    }

    pub fn with_math(mut self, math: Arc<dyn MathSolver>) -> Self {
        self.math = math;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// 处理一条用户输入，返回回复文本
    ///
    /// 每次调用恰好向历史追加一条 user + 一条 bot（空输入不入历史）。
    pub async fn handle(&mut self, raw: &str) -> String {
        let original = raw.trim().to_string();
        if original.is_empty() {
            return EMPTY_INPUT_REPLY.to_string();
        }
        let normalized = original.to_lowercase();
        tracing::info!(session = %self.session.id, input_chars = original.chars().count(), "handle utterance");

        let reply = self.respond(&normalized, &original).await;
        self.session.record_exchange(original, reply.clone());
        reply
    }

    async fn respond(&mut self, norm: &str, original: &str) -> String {
        // 1. 待确认槽位：挂起期间不评估任何其他规则
        if let Some(pending) = self.session.pending.clone() {
            return self.resolve_pending(&pending, norm);
        }
        if let Some(reply) = self.try_greeting(norm) {
            return reply;
        }
        if let Some(reply) = self.try_reference(norm, original).await {
            return reply;
        }
        if let Some(reply) = self.try_topic(norm) {
            return reply;
        }
        if let Some(reply) = self.try_run_code(norm, original) {
            return reply;
        }
        if let Some(reply) = self.try_math(norm, original) {
            return reply;
        }
        if let Some(reply) = self.try_explain_again(norm) {
            return reply;
        }
        if let Some(reply) = self.try_farewell(norm) {
            return reply;
        }
        if let Some(reply) = self.try_store(norm) {
            return reply;
        }
        self.fallback(original).await
    }

    /// 规则 1：待确认槽位。yes → 可视化解释并清除；no → 致谢并清除；其余重问、状态不变。
    fn resolve_pending(&mut self, pending: &Pending, norm: &str) -> String {
        if norm.contains("yes") {
            self.session.pending = None;
            match pending.kind {
                PendingKind::TopicVisual => match self.catalog.get(&pending.subject) {
                    Some(entry) => entry.visual.to_string(),
                    None => {
                        // 不变式被破坏：pending 指向未知主题，按编程错误记日志
                        tracing::error!(
                            subject = %pending.subject,
                            "pending confirmation references unknown topic"
                        );
                        "Sorry, I don't have a visual for that yet.".to_string()
                    }
                },
            }
        } else if norm.contains("no") {
            self.session.pending = None;
            VISUAL_DECLINED.to_string()
        } else {
            VISUAL_REPROMPT.to_string()
        }
    }

    /// 规则 2：问候（固定 token 集的子串匹配）
    fn try_greeting(&self, norm: &str) -> Option<String> {
        GREETING_TOKENS
            .iter()
            .any(|t| norm.contains(t))
            .then(|| GREETING_REPLY.to_string())
    }

    /// 规则 3：外部检索命令。空 remainder 提示补主题；适配器失败归一化为文案。
    async fn try_reference(&self, norm: &str, original: &str) -> Option<String> {
        let (source, prefix) = if norm.starts_with(WIKI_PREFIX) {
            (&self.wikipedia, WIKI_PREFIX)
        } else if norm.starts_with(DOCS_PREFIX) {
            (&self.python_docs, DOCS_PREFIX)
        } else {
            return None;
        };
        let topic = original.get(prefix.len()..).unwrap_or("").trim();
        if topic.is_empty() {
            return Some(format!(
                "Please provide a topic to search on {}.",
                source.name()
            ));
        }

        let name = source.name().to_string();
        tracing::info!(source = %name, topic = %topic, "reference lookup");
        let result = tokio::time::timeout(self.reference_timeout, source.fetch_summary(topic)).await;
        Some(match result {
            Ok(Ok(summary)) => format!("{}: {}", name, summary),
            Ok(Err(FetchError::Status(_))) => format!("Couldn't find that on {}.", name),
            Ok(Err(FetchError::NoContent)) => format!("No summary found on {}.", name),
            Ok(Err(FetchError::Request(e))) => format!("Error searching {}: {}", name, e),
            Err(_) => format!("Error searching {}: timed out", name),
        })
    }

    /// 规则 4：主题目录。命中即设置 last_topic 并挂起可视化确认。
    fn try_topic(&mut self, norm: &str) -> Option<String> {
        let entry = self.catalog.lookup(norm)?;
        self.session.last_topic = Some(entry.key.to_string());
        self.session.pending = Some(Pending {
            kind: PendingKind::TopicVisual,
            subject: entry.key.to_string(),
        });
        Some(format!("{}{}", entry.explanation, VISUAL_PROMPT))
    }

    /// 规则 5：沙箱执行
    fn try_run_code(&self, norm: &str, original: &str) -> Option<String> {
        if !norm.starts_with(RUN_PREFIX) {
            return None;
        }
        let code = original.get(RUN_PREFIX.len()..).unwrap_or("").trim();
        tracing::info!(code_chars = code.chars().count(), "sandbox execute");
        Some(match self.sandbox.execute(code) {
            Ok(result) => format!("Code executed. Locals: {}", result.summary()),
            Err(e) => format!("Error running code: {}", e),
        })
    }

    /// 规则 6：数学求解。显式 solve: 失败上报；启发式（含运算符字符）失败吞掉并
    /// 落到后续规则。不对称是接口契约的一部分，勿改成统一上报。
    fn try_math(&self, norm: &str, original: &str) -> Option<String> {
        if norm.starts_with(SOLVE_PREFIX) {
            let expr = original.get(SOLVE_PREFIX.len()..).unwrap_or("").trim();
            return Some(match self.math.evaluate_expression(expr) {
                Ok(result) => format!("Math result: {}", result),
                Err(e) => format!("Error solving math: {}", e),
            });
        }
        if original.contains(MATH_OPERATOR_CHARS) {
            match self.math.evaluate_expression(original) {
                Ok(result) => return Some(format!("Math result: {}", result)),
                Err(e) => {
                    tracing::warn!(error = %e, "heuristic math evaluation failed, falling through");
                }
            }
        }
        None
    }

    /// 规则 7：上下文追问。last_topic 不在目录中时降级为点名主题（目录运行期不变，
    /// 此分支只防御状态与目录脱节的编程错误）。
    fn try_explain_again(&self, norm: &str) -> Option<String> {
        if !norm.contains("explain again") {
            return None;
        }
        let topic = self.session.last_topic.as_deref()?;
        Some(match self.catalog.get(topic) {
            Some(entry) => entry.explanation.to_string(),
            None => format!("Here's what I last explained: {}", topic),
        })
    }

    /// 规则 8：告别
    fn try_farewell(&self, norm: &str) -> Option<String> {
        FAREWELL_TOKENS
            .iter()
            .any(|t| norm.contains(t))
            .then(|| FAREWELL_REPLY.to_string())
    }

    /// 规则 9：事实 / 代码示例库。库错误按未命中处理（记日志）。
    fn try_store(&self, norm: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.lookup_fact(norm) {
            Ok(Some(value)) => return Some(format!("From my database: {}", value)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "fact lookup failed"),
        }
        match store.lookup_code_example(norm) {
            Ok(Some(example)) => Some(format!(
                "Code example: {}\nExplanation: {}",
                example.snippet, example.explanation
            )),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "code example lookup failed");
                None
            }
        }
    }

    /// 规则 10：生成式 fallback；生成器缺席或失败时回固定帮助文案
    async fn fallback(&self, original: &str) -> String {
        if let Some(generator) = &self.generator {
            let result = tokio::time::timeout(
                self.generation_timeout,
                generator.generate_continuation(original, self.generation_max_length),
            )
            .await;
            match result {
                Ok(Ok(text)) => return text,
                Ok(Err(e)) => tracing::warn!(error = %e, "generation fallback failed"),
                Err(_) => tracing::warn!("generation fallback timed out"),
            }
        }
        self.help_text()
    }

    fn help_text(&self) -> String {
        format!(
            "I'm not sure about that. Try asking about Python basics, request a code example, or search Wikipedia/Python docs.\nYou can ask about: {}.",
            self.catalog.keys().join(", ")
        )
    }
}
