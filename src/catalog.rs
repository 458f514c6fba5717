//! 主题目录：Python 概念关键词 → 解释文本与可视化示例
//!
//! 静态只读表，构造后不再变化（不可变即线程安全）。匹配按声明顺序做子串扫描，
//! 第一个命中的键生效；顺序是接口契约的一部分，不是实现巧合。

/// 单个主题条目：键唯一，explanation 为简短解释，visual 为展开的可视化示例
#[derive(Debug, Clone)]
pub struct TopicEntry {
    pub key: &'static str,
    pub explanation: &'static str,
    pub visual: &'static str,
}

/// 声明顺序即扫描顺序。新增主题请追加到末尾，避免改变已有键的优先级。
const TOPICS: &[TopicEntry] = &[
    TopicEntry {
        key: "variable",
        explanation: "A variable stores data. Example: x = 5",
        visual: "Here's a visual example of a variable:\n[x = 5]\n(Imagine a box labeled 'x' with value 5)",
    },
    TopicEntry {
        key: "loop",
        explanation: "A loop repeats code. Example: for i in range(5): print(i)",
        visual: "Here's a visual example of a loop:\n[for i in range(5):\n    print(i)]\n(Each pass prints the next i: 0, 1, 2, 3, 4)",
    },
    TopicEntry {
        key: "function",
        explanation: "A function is a block of code. Example: def greet(): print('Hi')",
        visual: "Here's a visual example of a function:\n[def greet():\n    print('Hi')]\n(Calling greet() jumps into the block, runs it, and returns)",
    },
    TopicEntry {
        key: "list",
        explanation: "A list holds items. Example: fruits = ['apple', 'banana']",
        visual: "Here's a visual example of a list:\n[fruits = ['apple', 'banana']]\n(Imagine numbered boxes: 0 -> 'apple', 1 -> 'banana')",
    },
    TopicEntry {
        key: "tuple",
        explanation: "A tuple is like a list but unchangeable. Example: coords = (1, 2)",
        visual: "Here's a visual example of a tuple:\n[coords = (1, 2)]\n(Same boxes as a list, but sealed shut - no reassignment)",
    },
    TopicEntry {
        key: "dictionary",
        explanation: "A dictionary stores key-value pairs. Example: ages = {'Alice': 30, 'Bob': 25}",
        visual: "Here's a visual example of a dictionary:\n[ages = {'Alice': 30, 'Bob': 25}]\n(Imagine labeled drawers: open 'Alice' to find 30)",
    },
    TopicEntry {
        key: "set",
        explanation: "A set is a collection of unique items. Example: nums = {1, 2, 3}",
        visual: "Here's a visual example of a set:\n[nums = {1, 2, 3}]\n(A bag of items - adding 2 again changes nothing)",
    },
    TopicEntry {
        key: "comprehension",
        explanation: "A list comprehension is a concise way to create lists. Example: squares = [x*x for x in range(5)]",
        visual: "Here's a visual example of a comprehension:\n[squares = [x*x for x in range(5)]]\n(A loop folded into one line: [0, 1, 4, 9, 16])",
    },
    TopicEntry {
        key: "exception",
        explanation: "Exceptions handle errors. Example: try: ... except Exception as e: ...",
        visual: "Here's a visual example of an exception:\n[try:\n    1 / 0\nexcept ZeroDivisionError:\n    print('caught!')]\n(The error jumps from try straight into except)",
    },
    TopicEntry {
        key: "import",
        explanation: "Use import to include modules. Example: import math",
        visual: "Here's a visual example of an import:\n[import math\nmath.sqrt(16)]\n(import plugs the math toolbox into your program)",
    },
    TopicEntry {
        key: "class",
        explanation: "A class defines a blueprint for objects. Example: class Dog: pass",
        visual: "Here's a visual example of a class:\n[class Dog:\n    def bark(self):\n        print('Woof')]\n(The class is the blueprint; Dog() builds one dog from it)",
    },
];

/// 主题目录：只读，按声明顺序扫描
#[derive(Debug, Clone, Default)]
pub struct TopicCatalog;

impl TopicCatalog {
    pub fn new() -> Self {
        Self
    }

    /// 子串扫描：输入需已归一化（trim + 小写）。第一个命中的键生效。
    pub fn lookup(&self, normalized: &str) -> Option<&'static TopicEntry> {
        TOPICS.iter().find(|t| normalized.contains(t.key))
    }

    /// 精确键查找（用于 last_topic / 待确认槽位的回查）
    pub fn get(&self, key: &str) -> Option<&'static TopicEntry> {
        TOPICS.iter().find(|t| t.key == key)
    }

    /// 全部键，按声明顺序（用于 fallback 帮助文案）
    pub fn keys(&self) -> Vec<&'static str> {
        TOPICS.iter().map(|t| t.key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_substring_match() {
        let catalog = TopicCatalog::new();
        let entry = catalog.lookup("what is a loop").unwrap();
        assert_eq!(entry.key, "loop");
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let catalog = TopicCatalog::new();
        let a = catalog.lookup("tell me about tuple").unwrap().explanation;
        let b = catalog.lookup("tell me about tuple").unwrap().explanation;
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookup_order_is_declaration_order() {
        let catalog = TopicCatalog::new();
        // "variable" 声明在 "list" 之前，两者都命中时取前者
        let entry = catalog.lookup("a variable inside a list").unwrap();
        assert_eq!(entry.key, "variable");
    }

    #[test]
    fn test_keys_are_unique() {
        let catalog = TopicCatalog::new();
        let keys = catalog.keys();
        let mut dedup = keys.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(keys.len(), dedup.len());
    }

    #[test]
    fn test_every_key_has_visual() {
        let catalog = TopicCatalog::new();
        for key in catalog.keys() {
            let entry = catalog.get(key).unwrap();
            assert!(!entry.visual.is_empty(), "missing visual for {}", key);
        }
    }

    #[test]
    fn test_get_unknown_key() {
        let catalog = TopicCatalog::new();
        assert!(catalog.get("monad").is_none());
    }
}
