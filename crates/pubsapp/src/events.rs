//! # Repository Events
//!
//! The repository announces additions, removals and renames to registered
//! listeners. Delivery is synchronous, in registration order, and best
//! effort: a listener that fails is logged and skipped, and the operation
//! that emitted the event carries on. Listeners must not call back into the
//! repository.
//!
//! `Remove` is sent *before* anything is deleted, so a listener can still
//! read the paper it is told about.

use crate::error::Result;
use crate::model::Paper;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Add { citekey: String },
    Remove { citekey: String },
    Rename { paper: Paper, old_citekey: String },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Add { .. } => "add",
            Event::Remove { .. } => "remove",
            Event::Rename { .. } => "rename",
        }
    }

    /// The citekey the event is about (the new one, for renames).
    pub fn citekey(&self) -> &str {
        match self {
            Event::Add { citekey } | Event::Remove { citekey } => citekey,
            Event::Rename { paper, .. } => paper.citekey(),
        }
    }
}

pub trait EventListener {
    fn notify(&self, event: &Event) -> Result<()>;
}

impl<F> EventListener for F
where
    F: Fn(&Event) -> Result<()>,
{
    fn notify(&self, event: &Event) -> Result<()> {
        self(event)
    }
}

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener. Returns how many failed.
    pub fn send(&self, event: &Event) -> usize {
        let mut failures = 0;
        for (position, listener) in self.listeners.iter().enumerate() {
            if let Err(e) = listener.notify(event) {
                failures += 1;
                warn!(
                    event = event.name(),
                    citekey = event.citekey(),
                    listener = position,
                    error = %e,
                    "event listener failed"
                );
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PubsError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Box<dyn EventListener> {
        let log = Rc::clone(log);
        Box::new(move |event: &Event| {
            log.borrow_mut()
                .push(format!("{}:{}:{}", tag, event.name(), event.citekey()));
            Ok(())
        })
    }

    #[test]
    fn test_delivers_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(recorder(&log, "first"));
        bus.register(recorder(&log, "second"));

        let failures = bus.send(&Event::Add {
            citekey: "k".into(),
        });

        assert_eq!(failures, 0);
        assert_eq!(*log.borrow(), vec!["first:add:k", "second:add:k"]);
    }

    #[test]
    fn test_failing_listener_does_not_stop_delivery() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(Box::new(|_: &Event| -> Result<()> {
            Err(PubsError::Api("boom".into()))
        }));
        bus.register(recorder(&log, "after"));

        let failures = bus.send(&Event::Remove {
            citekey: "k".into(),
        });

        assert_eq!(failures, 1);
        assert_eq!(*log.borrow(), vec!["after:remove:k"]);
    }

    #[test]
    fn test_empty_bus() {
        let bus = EventBus::new();
        assert!(bus.is_empty());
        assert_eq!(
            bus.send(&Event::Add {
                citekey: "k".into()
            }),
            0
        );
    }
}
