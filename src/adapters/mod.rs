//! 外部协作者适配器
//!
//! 核心通过窄接口消费这些能力，全部失败类型化并由 Router 转成用户可见文本：
//! - **reference**: Wikipedia / Python docs 摘要检索（reqwest + html2text）
//! - **math**: 算式求解（复用沙箱表达式文法）
//! - **generation**: 文本生成 fallback（OpenAI 兼容端点 / Mock）
//! - **store**: facts / code_examples 持久库（SQLite）

pub mod generation;
pub mod math;
pub mod reference;
pub mod store;

pub use generation::{GenerationError, Generator, MockGenerator, OpenAiGenerator};
pub use math::{ExprSolver, MathError, MathSolver};
pub use reference::{FetchError, PythonDocsSource, ReferenceSource, WikipediaSource};
pub use store::{CodeExample, FactStore, StoreError};
