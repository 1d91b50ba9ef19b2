//! Lazy stream adapter over [`JsonObjectExtractor`]

use crate::extractor::JsonObjectExtractor;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;

struct ObjectStreamState<S> {
    source: Pin<Box<S>>,
    extractor: JsonObjectExtractor,
    ready: VecDeque<Value>,
    exhausted: bool,
}

/// Turn a stream of text fragments into a stream of JSON objects
///
/// Each object is yielded as soon as the fragment that closes it arrives.
/// A source error is forwarded once and ends the stream; values already
/// extracted before the error are yielded first. An unterminated trailing
/// object at end of input is dropped.
pub fn json_objects<S, E>(fragments: S) -> impl Stream<Item = Result<Value, E>>
where
    S: Stream<Item = Result<String, E>>,
{
    let state = ObjectStreamState {
        source: Box::pin(fragments),
        extractor: JsonObjectExtractor::new(),
        ready: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(value) = state.ready.pop_front() {
                return Some((Ok(value), state));
            }
            if state.exhausted {
                return None;
            }

            match state.source.next().await {
                Some(Ok(fragment)) => state.ready.extend(state.extractor.push(&fragment)),
                Some(Err(error)) => {
                    state.exhausted = true;
                    return Some((Err(error), state));
                }
                None => {
                    state.exhausted = true;
                    let stats = state.extractor.stats();
                    let extractor = std::mem::take(&mut state.extractor);
                    if let Some(tail) = extractor.finish() {
                        tracing::debug!(
                            dropped_bytes = tail.len(),
                            "dropping unterminated trailing object"
                        );
                    }
                    tracing::debug!(
                        emitted = stats.objects_emitted,
                        malformed = stats.malformed_spans,
                        "object stream finished"
                    );
                }
            }
        }
    })
}
