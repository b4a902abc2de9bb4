//! Test helpers: capture tracing output emitted while a closure runs.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects the messages of events at one level.
#[derive(Clone)]
struct Capture {
    level: Level,
    lines: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        if *event.metadata().level() != self.level {
            return;
        }
        let mut message = MessageField(String::new());
        event.record(&mut message);
        self.lines.lock().unwrap().push(message.0);
    }
}

struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Messages logged at `level` on this thread while `f` runs.
pub(crate) fn logged_during(level: Level, f: impl FnOnce()) -> Vec<String> {
    let capture = Capture {
        level,
        lines: Arc::default(),
    };
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    let lines = capture.lines.lock().unwrap().clone();
    lines
}
