//! Message dispatcher
//!
//! Fans one message out to the registry in a fixed order: next-data, then
//! each-data, then (only when text observers exist) next-message and
//! each-message with a single shared decode.

use std::borrow::Cow;

use tracing::trace;
use wsfanout_config::{DecodeErrorPolicy, TextDispatchConfig};

use crate::error::DecodeError;
use crate::message::Message;
use crate::registry::CallbackRegistry;

pub struct MessageDispatcher {
    text: TextDispatchConfig,
}

impl MessageDispatcher {
    pub fn new(text: TextDispatchConfig) -> Self {
        Self { text }
    }

    pub fn text_config(&self) -> &TextDispatchConfig {
        &self.text
    }

    /// Deliver `message` to every registered observer
    ///
    /// Stops after the data observers if one of them finished the
    /// connection. On a decode error the data observers have already run and the text
    /// observers were not called; next-message observers stay registered.
    /// Never fails under [`DecodeErrorPolicy::Lossy`].
    pub fn dispatch(&self, registry: &CallbackRegistry, message: &Message) -> Result<(), DecodeError> {
        trace!(
            "[DISPATCH] {:?} message, {} bytes",
            message.kind(),
            message.len()
        );

        let next_text = registry.next_message.snapshot();
        let each_text = registry.each_message.snapshot();

        registry.next_data.dispatch(message);
        registry.each_data.dispatch(message);

        if registry.finish.is_finished() {
            trace!("[DISPATCH] Finished during data observers, text dispatch dropped");
            return Ok(());
        }
        if next_text.is_empty() && each_text.is_empty() {
            return Ok(());
        }
        if message.is_binary() && !self.text.decode_binary {
            return Ok(());
        }

        let text = match self.text.on_decode_error {
            DecodeErrorPolicy::Lossy => message.to_text_lossy(),
            DecodeErrorPolicy::SkipText | DecodeErrorPolicy::FailConnection => {
                Cow::Borrowed(message.to_text()?)
            }
        };

        if !next_text.is_empty() {
            registry.next_message.dispatch_snapshot(next_text, &text);
        }
        if !each_text.is_empty() {
            registry.each_message.dispatch_snapshot(each_text, &text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log_registry() -> (CallbackRegistry, Rc<RefCell<Vec<String>>>) {
        let registry = CallbackRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        registry
            .each_message
            .subscribe(move |text| l.borrow_mut().push(format!("each_message:{}", text)));
        let l = Rc::clone(&log);
        registry
            .next_message
            .subscribe(move |text| l.borrow_mut().push(format!("next_message:{}", text)));
        let l = Rc::clone(&log);
        registry
            .each_data
            .subscribe(move |msg: &Message| l.borrow_mut().push(format!("each_data:{}", msg.len())));
        let l = Rc::clone(&log);
        registry
            .next_data
            .subscribe(move |msg: &Message| l.borrow_mut().push(format!("next_data:{}", msg.len())));

        (registry, log)
    }

    #[test]
    fn test_dispatch_order() {
        let (registry, log) = log_registry();
        let dispatcher = MessageDispatcher::new(TextDispatchConfig::default());

        dispatcher.dispatch(&registry, &Message::text("ab")).unwrap();
        dispatcher.dispatch(&registry, &Message::text("c")).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "next_data:2",
                "each_data:2",
                "next_message:ab",
                "each_message:ab",
                "each_data:1",
                "each_message:c",
            ]
        );
    }

    #[test]
    fn test_no_decode_without_text_observers() {
        let registry = CallbackRegistry::new();
        let dispatcher = MessageDispatcher::new(TextDispatchConfig::default());
        assert!(dispatcher
            .dispatch(&registry, &Message::binary(vec![0xFFu8]))
            .is_ok());
    }

    #[test]
    fn test_skip_text_keeps_next_message_observers() {
        let (registry, log) = log_registry();
        let dispatcher = MessageDispatcher::new(TextDispatchConfig::default());

        assert!(dispatcher
            .dispatch(&registry, &Message::binary(vec![0xFFu8]))
            .is_err());
        assert_eq!(*log.borrow(), vec!["next_data:1", "each_data:1"]);
        assert_eq!(registry.next_message.len(), 1);
    }

    #[test]
    fn test_binary_not_decoded_when_disabled() {
        let (registry, log) = log_registry();
        let dispatcher = MessageDispatcher::new(TextDispatchConfig {
            decode_binary: false,
            ..Default::default()
        });

        dispatcher.dispatch(&registry, &Message::binary(vec![b'x'])).unwrap();
        assert_eq!(*log.borrow(), vec!["next_data:1", "each_data:1"]);
        assert_eq!(registry.next_message.len(), 1);
    }

    #[test]
    fn test_finish_during_data_phase_skips_text_observers() {
        let registry = Rc::new(CallbackRegistry::new());
        let texts = Rc::new(RefCell::new(Vec::new()));

        let t = Rc::clone(&texts);
        registry
            .each_message
            .subscribe(move |text| t.borrow_mut().push(text.to_string()));
        let weak = Rc::downgrade(&registry);
        registry.each_data.subscribe(move |_: &Message| {
            if let Some(registry) = weak.upgrade() {
                registry.clear_subscriptions();
                registry.finish.fire();
            }
        });

        let dispatcher = MessageDispatcher::new(TextDispatchConfig::default());
        dispatcher.dispatch(&registry, &Message::text("late")).unwrap();
        assert!(texts.borrow().is_empty());
    }

    #[test]
    fn test_lossy_decode() {
        let (registry, log) = log_registry();
        let dispatcher = MessageDispatcher::new(TextDispatchConfig {
            on_decode_error: DecodeErrorPolicy::Lossy,
            ..Default::default()
        });

        dispatcher
            .dispatch(&registry, &Message::binary(vec![b'a', 0xFF]))
            .unwrap();
        assert!(log.borrow().contains(&"each_message:a\u{FFFD}".to_string()));
    }
}
