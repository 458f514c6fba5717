//! 会话状态：有界对话历史、最近主题、待确认槽位
//!
//! 每个会话一个 SessionState，由 Router 独占持有并修改，不经任何全局状态，
//! 同进程多会话互不干扰。历史保留最近 max_exchanges 轮（user + bot 各一条），
//! 超出时丢弃最旧的消息。

use serde::{Deserialize, Serialize};

/// 发言方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Bot,
}

/// 单条对话记录，追加后不再修改
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}

/// 待确认的类型（目前仅主题可视化一种；保留枚举以便扩展）
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingKind {
    TopicVisual,
}

/// 待确认记录：机器人上一轮提出的 yes/no 问题，下一轮必须先解决
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pending {
    pub kind: PendingKind,
    pub subject: String,
}

/// 会话状态
///
/// 不变式：pending 仅由主题查找路径设置，仅由肯定 / 否定回复两条路径清除；
/// 设置期间其他意图规则不会被评估。
#[derive(Clone, Debug)]
pub struct SessionState {
    /// 会话 ID（日志用）
    pub id: String,
    turns: Vec<Turn>,
    max_exchanges: usize,
    pub last_topic: Option<String>,
    pub pending: Option<Pending>,
}

impl SessionState {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            id: format!("session_{}", uuid::Uuid::new_v4()),
            turns: Vec::new(),
            max_exchanges,
            last_topic: None,
            pending: None,
        }
    }

    /// 追加一条记录并裁剪到最近 max_exchanges*2 条
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.prune();
    }

    /// 记录一轮完整交换（user + bot），每次 Router::handle 恰好调用一次
    pub fn record_exchange(&mut self, user_text: impl Into<String>, bot_text: impl Into<String>) {
        self.push(Turn::user(user_text));
        self.push(Turn::bot(bot_text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// 超出上限时丢弃最旧的记录，保留最近部分
    fn prune(&mut self) {
        let keep = self.max_exchanges * 2;
        if self.turns.len() > keep {
            let drop = self.turns.len() - keep;
            self.turns.drain(..drop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_bounded_fifo() {
        let mut s = SessionState::new(3);
        for i in 0..5 {
            s.record_exchange(format!("u{}", i), format!("b{}", i));
        }
        // 3 轮 = 6 条；最旧的 u0/b0/u1/b1 已被淘汰
        assert_eq!(s.len(), 6);
        assert_eq!(s.turns()[0].text, "u2");
        assert_eq!(s.turns().last().unwrap().text, "b4");
    }

    #[test]
    fn test_oldest_evicted_after_k_plus_2_turns() {
        let mut s = SessionState::new(2);
        s.record_exchange("first", "r1");
        s.record_exchange("second", "r2");
        assert!(s.turns().iter().any(|t| t.text == "first"));
        // 第 K+1、K+2 条到来后，最旧的一对被淘汰
        s.record_exchange("third", "r3");
        assert_eq!(s.len(), 4);
        assert!(!s.turns().iter().any(|t| t.text == "first"));
        assert!(s.turns().iter().any(|t| t.text == "third"));
    }

    #[test]
    fn test_pending_roundtrip() {
        let mut s = SessionState::new(3);
        assert!(s.pending.is_none());
        s.pending = Some(Pending {
            kind: PendingKind::TopicVisual,
            subject: "loop".to_string(),
        });
        assert_eq!(s.pending.as_ref().unwrap().subject, "loop");
        s.pending = None;
        assert!(s.pending.is_none());
    }

    #[test]
    fn test_turns_serialize_to_json() {
        let mut s = SessionState::new(3);
        s.record_exchange("hello", "Hello!");
        let json = serde_json::to_string(s.turns()).unwrap();
        assert!(json.contains("\"speaker\":\"User\""));
        let back: Vec<Turn> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = SessionState::new(3);
        let b = SessionState::new(3);
        a.last_topic = Some("loop".to_string());
        assert!(b.last_topic.is_none());
        assert_ne!(a.id, b.id);
    }
}
