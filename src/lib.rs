//! PyTutor - Rust Python 学习助手
//!
//! 模块划分：
//! - **adapters**: 外部协作者（Wikipedia / Python docs 检索、算式求解、文本生成、事实库）
//! - **catalog**: 主题目录（关键词 → 解释 / 可视化示例的静态表）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **observability**: tracing 日志初始化
//! - **router**: 意图路由器（固定优先级规则链 + 会话状态更新）
//! - **sandbox**: 受限求值沙箱（仅赋值 / 表达式小语言，无 import、文件、网络能力）
//! - **session**: 会话状态（有界历史、最近主题、待确认槽位）

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod observability;
pub mod router;
pub mod sandbox;
pub mod session;

pub use router::Router;
pub use session::SessionState;
