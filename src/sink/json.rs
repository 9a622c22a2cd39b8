use serde::Serialize;
use std::io::Write;

use crate::timeline::TimelineEvent;

use super::PresentationSink;

// Set to true to report write failures
const ENABLE_LOGS: bool = true;

use crate::log_warn;

#[derive(Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
enum Envelope<'a> {
    #[serde(rename = "event")]
    Event { event: &'a TimelineEvent },
    #[serde(rename = "resize", rename_all = "camelCase")]
    Resize { viewport_width: u16 },
}

/// Writes every event as one JSON object per line, for a front end in another
/// process to render.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, envelope: &Envelope<'_>) {
        let result = serde_json::to_writer(&mut self.writer, envelope)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(err) = result {
            log_warn!("failed to write timeline event: {err}");
        }
    }
}

impl<W: Write> PresentationSink for JsonLinesSink<W> {
    fn emit(&mut self, event: TimelineEvent) {
        self.write(&Envelope::Event { event: &event });
    }

    fn resize(&mut self, viewport_width: u16) {
        self.write(&Envelope::Resize { viewport_width });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TopicId;

    #[test]
    fn writes_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(TimelineEvent::TopicDurationUpdated {
            topic: TopicId(1),
            total_seconds: 4.0,
        });
        sink.resize(100);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "event");
        assert_eq!(lines[0]["event"]["kind"], "topicDurationUpdated");
        assert_eq!(lines[0]["event"]["totalSeconds"], 4.0);
        assert_eq!(lines[1]["kind"], "resize");
        assert_eq!(lines[1]["viewportWidth"], 100);
    }
}
