//! Inbound event handler table.
//!
//! One handler per event kind. Registering a second handler for the same kind
//! replaces the first, so a handler never runs twice for one event.

use std::{collections::HashMap, sync::Arc};

use goishi_shared::protocol::{ServerEvent, ServerEventKind};

pub type Handler = Arc<dyn Fn(&ServerEvent) + Send + Sync>;

#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<ServerEventKind, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler that was replaced, if any
    pub fn register(&mut self, kind: ServerEventKind, handler: Handler) -> Option<Handler> {
        self.handlers.insert(kind, handler)
    }

    pub fn unregister(&mut self, kind: ServerEventKind) -> Option<Handler> {
        self.handlers.remove(&kind)
    }

    pub fn get(&self, kind: ServerEventKind) -> Option<Handler> {
        self.handlers.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Handler {
        let counter = counter.clone();
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_reregistration_replaces_handler() {
        // テスト項目: 同じ種別に再登録すると前のハンドラは呼ばれなくなる
        // given (前提条件):
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut table = HandlerTable::new();
        table.register(ServerEventKind::Moved, counting(&first));

        // when (操作):
        let replaced = table.register(ServerEventKind::Moved, counting(&second));
        let handler = table.get(ServerEventKind::Moved).unwrap();
        handler(&ServerEvent::error("x"));

        // then (期待する結果):
        assert!(replaced.is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_removes_handler() {
        // テスト項目: 登録解除したハンドラは取得できない
        let counter = Arc::new(AtomicUsize::new(0));
        let mut table = HandlerTable::new();
        table.register(ServerEventKind::GameOver, counting(&counter));

        assert!(table.unregister(ServerEventKind::GameOver).is_some());
        assert!(table.get(ServerEventKind::GameOver).is_none());
        assert!(table.is_empty());
    }
}
